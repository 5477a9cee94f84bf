//! One-rep-max estimation and next-session suggestions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::sets::{SetSummary, best_by_volume};

/// Rep count at which the next session should add weight instead of reps.
pub const TARGET_REPS: i32 = 8;

/// Brzycki's denominator reaches zero at 37 reps.
const BRZYCKI_REP_LIMIT: i32 = 37;

/// Estimated one-rep max using the Brzycki formula.
///
/// A single rep is already a max. At 37 reps and above the formula
/// degenerates, so the raw weight is returned.
pub fn estimated_one_rep_max(weight: f64, reps: i32) -> f64 {
    if reps == 1 || reps >= BRZYCKI_REP_LIMIT {
        return weight;
    }
    weight * 36.0 / f64::from(BRZYCKI_REP_LIMIT - reps)
}

/// Recommended target for the next session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressionSuggestion {
    /// Suggested weight for next session
    pub recommended_weight: f64,
    /// Suggested reps for next session
    pub recommended_reps: i32,
    /// Explanation of the suggestion
    pub rationale: String,
}

/// Derive a suggestion from the sets of a single session.
///
/// The input set is the session's best by volume. Hitting [`TARGET_REPS`]
/// earns a unit-sized weight increase at the same reps; otherwise the weight
/// holds and one more rep is the goal. An empty session yields `None`.
pub fn suggest_progression(session_sets: &[SetSummary]) -> Option<ProgressionSuggestion> {
    let best = best_by_volume(session_sets)?;

    if best.reps >= TARGET_REPS {
        let increment = best.unit.increment();
        Some(ProgressionSuggestion {
            recommended_weight: best.weight + increment,
            recommended_reps: best.reps,
            rationale: format!(
                "You hit target reps - increase weight by {} {}",
                increment,
                best.unit.label()
            ),
        })
    } else {
        Some(ProgressionSuggestion {
            recommended_weight: best.weight,
            recommended_reps: best.reps + 1,
            rationale: "Keep weight, aim for more reps".to_string(),
        })
    }
}
