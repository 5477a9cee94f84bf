use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unit a set was logged in.
///
/// `Kg` is plate/dumbbell weight; `Stacks` counts pin positions on a
/// selectorized machine, where the absolute load is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SetUnit {
    Kg,
    Stacks,
}

impl SetUnit {
    /// Storage / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Stacks => "stacks",
        }
    }

    /// Singular label used in suggestion text ("2.5 kg", "1 stack").
    pub fn label(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Stacks => "stack",
        }
    }

    /// Weight step recommended once the rep target is reached.
    pub fn increment(self) -> f64 {
        match self {
            Self::Kg => 2.5,
            Self::Stacks => 1.0,
        }
    }
}

impl fmt::Display for SetUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Self::Kg),
            "stacks" => Ok(Self::Stacks),
            other => Err(format!("Unknown set unit: {other}")),
        }
    }
}

/// A single performed set as shown in history views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetSummary {
    /// Weight used for the set
    pub weight: f64,
    /// Number of repetitions
    pub reps: i32,
    /// Unit of measurement
    pub unit: SetUnit,
}

impl SetSummary {
    /// weight × reps
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// Set with the highest volume (weight × reps).
///
/// On equal volume the earliest set in `sets` wins. Returns `None` for an
/// empty slice.
pub fn best_by_volume(sets: &[SetSummary]) -> Option<&SetSummary> {
    let mut best: Option<&SetSummary> = None;
    for set in sets {
        match best {
            Some(current) if set.volume() <= current.volume() => {}
            _ => best = Some(set),
        }
    }
    best
}

/// Σ weight × reps across `sets`.
pub fn total_volume(sets: &[SetSummary]) -> f64 {
    sets.iter().map(SetSummary::volume).sum()
}
