//! Per-exercise training history for a single user.
//!
//! Builds four read-only views from the user's logged sets: the most recent
//! session, the all-time best set by estimated one-rep max, a short window of
//! recent sessions, and a suggestion for the next session.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::progression::{ProgressionSuggestion, estimated_one_rep_max, suggest_progression};
use crate::sets::{SetSummary, SetUnit, best_by_volume, total_volume};

/// How many sessions `recent_sessions` holds at most.
pub const RECENT_SESSION_LIMIT: usize = 5;

/// One logged set joined with the session it belongs to.
///
/// Sources must hand rows over newest session first: session date
/// descending, then session id descending, sets in stored order within a
/// session.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub weight: f64,
    pub reps: i32,
    pub unit: SetUnit,
    pub date: DateTime<Utc>,
    pub session_id: i64,
}

impl HistoryRow {
    fn summary(&self) -> SetSummary {
        SetSummary {
            weight: self.weight,
            reps: self.reps,
            unit: self.unit,
        }
    }
}

/// The most recent session in which the exercise was performed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LastPerformed {
    /// ID of the most recent session
    pub session_id: i64,
    /// Date of the session
    pub date: DateTime<Utc>,
    /// Sets performed in that session, in logged order
    pub sets: Vec<SetSummary>,
    /// Heaviest weight used in the session
    pub max_weight: f64,
    /// Σ weight × reps over the session's sets
    pub total_volume: f64,
}

/// All-time best set by estimated one-rep max.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PersonalBest {
    pub weight: f64,
    pub reps: i32,
    /// Date of the session the set was logged in
    pub date: DateTime<Utc>,
    pub session_id: i64,
    /// Brzycki estimate for this set
    pub estimated_1rm: f64,
}

/// Summary of one recent session.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecentSession {
    pub session_id: i64,
    pub date: DateTime<Utc>,
    pub sets: Vec<SetSummary>,
    /// Highest weight × reps in the session
    pub best_set: SetSummary,
}

/// Complete history view for one exercise and one user.
///
/// A user without logged sets gets `None`/empty for every derived field;
/// that is a valid answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExerciseHistory {
    pub exercise_id: i64,
    pub last_performed: Option<LastPerformed>,
    pub personal_best: Option<PersonalBest>,
    /// Newest first, at most [`RECENT_SESSION_LIMIT`] entries
    pub recent_sessions: Vec<RecentSession>,
    pub progression_suggestion: Option<ProgressionSuggestion>,
}

impl ExerciseHistory {
    pub fn empty(exercise_id: i64) -> Self {
        Self {
            exercise_id,
            last_performed: None,
            personal_best: None,
            recent_sessions: Vec::new(),
            progression_suggestion: None,
        }
    }
}

/// Read access the history engine needs from storage.
pub trait HistorySource {
    type Error;

    /// Whether an exercise with this id exists.
    fn exercise_exists(
        &self,
        exercise_id: i64,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Every set the user logged for the exercise in real sessions (templates
    /// excluded), ordered as documented on [`HistoryRow`].
    fn history_rows(
        &self,
        exercise_id: i64,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<HistoryRow>, Self::Error>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError<E> {
    #[error("Exercise with id {0} not found")]
    ExerciseNotFound(i64),
    #[error(transparent)]
    Source(E),
}

/// Load and aggregate the user's history for an exercise.
///
/// Fails with [`HistoryError::ExerciseNotFound`] before reading any sets when
/// the exercise does not exist. An unknown user simply has no history.
pub async fn get_exercise_history<S>(
    source: &S,
    exercise_id: i64,
    user_id: i64,
) -> Result<ExerciseHistory, HistoryError<S::Error>>
where
    S: HistorySource + Sync,
{
    if !source
        .exercise_exists(exercise_id)
        .await
        .map_err(HistoryError::Source)?
    {
        return Err(HistoryError::ExerciseNotFound(exercise_id));
    }

    let rows = source
        .history_rows(exercise_id, user_id)
        .await
        .map_err(HistoryError::Source)?;

    Ok(build_history(exercise_id, &rows))
}

struct SessionGroup {
    session_id: i64,
    date: DateTime<Utc>,
    sets: Vec<SetSummary>,
}

/// Aggregate pre-ordered rows into an [`ExerciseHistory`].
pub fn build_history(exercise_id: i64, rows: &[HistoryRow]) -> ExerciseHistory {
    let sessions = group_by_session(rows);
    let Some(latest) = sessions.first() else {
        return ExerciseHistory::empty(exercise_id);
    };

    let last_performed = LastPerformed {
        session_id: latest.session_id,
        date: latest.date,
        sets: latest.sets.clone(),
        max_weight: latest
            .sets
            .iter()
            .map(|s| s.weight)
            .fold(f64::MIN, f64::max),
        total_volume: total_volume(&latest.sets),
    };
    let progression_suggestion = suggest_progression(&latest.sets);

    let personal_best = best_by_estimated_1rm(rows).map(|(row, estimated_1rm)| PersonalBest {
        weight: row.weight,
        reps: row.reps,
        date: row.date,
        session_id: row.session_id,
        estimated_1rm,
    });

    let recent_sessions = sessions
        .iter()
        .take(RECENT_SESSION_LIMIT)
        .filter_map(|group| {
            best_by_volume(&group.sets).map(|best| RecentSession {
                session_id: group.session_id,
                date: group.date,
                sets: group.sets.clone(),
                best_set: *best,
            })
        })
        .collect();

    ExerciseHistory {
        exercise_id,
        last_performed: Some(last_performed),
        personal_best,
        recent_sessions,
        progression_suggestion,
    }
}

/// Group rows by session, keeping first-seen order.
fn group_by_session(rows: &[HistoryRow]) -> Vec<SessionGroup> {
    let mut groups: Vec<SessionGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.session_id).or_insert_with(|| {
            groups.push(SessionGroup {
                session_id: row.session_id,
                date: row.date,
                sets: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].sets.push(row.summary());
    }

    groups
}

/// Row with the highest estimated one-rep max, paired with that estimate.
///
/// Equal estimates resolve to the earliest session (oldest date, then lowest
/// session id), and within one session to the first set logged.
fn best_by_estimated_1rm(rows: &[HistoryRow]) -> Option<(&HistoryRow, f64)> {
    let mut best: Option<(&HistoryRow, f64)> = None;

    for row in rows {
        let estimate = estimated_one_rep_max(row.weight, row.reps);
        let replace = match best {
            None => true,
            Some((current, current_estimate)) => {
                estimate > current_estimate
                    || (estimate == current_estimate
                        && (row.date, row.session_id) < (current.date, current.session_id))
            }
        };
        if replace {
            best = Some((row, estimate));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;

    use super::*;

    struct LoggedSession {
        id: i64,
        user_id: i64,
        date: DateTime<Utc>,
        exercises: Vec<(i64, Vec<SetSummary>)>,
    }

    /// In-memory stand-in that filters and orders like the SQL query.
    #[derive(Default)]
    struct MemorySource {
        exercises: Vec<i64>,
        sessions: Vec<LoggedSession>,
        row_queries: AtomicUsize,
    }

    impl MemorySource {
        fn with_exercises(ids: &[i64]) -> Self {
            Self {
                exercises: ids.to_vec(),
                ..Self::default()
            }
        }

        fn log(
            &mut self,
            id: i64,
            user_id: i64,
            date: DateTime<Utc>,
            exercise_id: i64,
            sets: Vec<SetSummary>,
        ) {
            self.sessions.push(LoggedSession {
                id,
                user_id,
                date,
                exercises: vec![(exercise_id, sets)],
            });
        }
    }

    impl HistorySource for MemorySource {
        type Error = std::convert::Infallible;

        async fn exercise_exists(&self, exercise_id: i64) -> Result<bool, Self::Error> {
            Ok(self.exercises.contains(&exercise_id))
        }

        async fn history_rows(
            &self,
            exercise_id: i64,
            user_id: i64,
        ) -> Result<Vec<HistoryRow>, Self::Error> {
            self.row_queries.fetch_add(1, Ordering::SeqCst);

            let mut sessions: Vec<&LoggedSession> =
                self.sessions.iter().filter(|s| s.user_id == user_id).collect();
            sessions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

            let mut rows = Vec::new();
            for session in sessions {
                for (logged_exercise, sets) in &session.exercises {
                    if *logged_exercise != exercise_id {
                        continue;
                    }
                    rows.extend(sets.iter().map(|s| HistoryRow {
                        weight: s.weight,
                        reps: s.reps,
                        unit: s.unit,
                        date: session.date,
                        session_id: session.id,
                    }));
                }
            }
            Ok(rows)
        }
    }

    const BENCH: i64 = 5;
    const SQUAT: i64 = 6;
    const ALICE: i64 = 1;
    const BOB: i64 = 2;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, d, 10, 30, 0).unwrap()
    }

    fn kg(weight: f64, reps: i32) -> SetSummary {
        SetSummary {
            weight,
            reps,
            unit: SetUnit::Kg,
        }
    }

    #[tokio::test]
    async fn unknown_exercise_is_not_found_without_reading_sets() {
        let source = MemorySource::with_exercises(&[BENCH]);

        let err = get_exercise_history(&source, 999, ALICE).await.unwrap_err();

        assert!(matches!(err, HistoryError::ExerciseNotFound(999)));
        assert_eq!(err.to_string(), "Exercise with id 999 not found");
        assert_eq!(source.row_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_logged_sets_yields_empty_history() {
        let source = MemorySource::with_exercises(&[BENCH]);

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        assert_eq!(history, ExerciseHistory::empty(BENCH));
        assert_eq!(source.row_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_session_summary_and_suggestion() {
        let mut source = MemorySource::with_exercises(&[BENCH]);
        source.log(42, ALICE, day(15), BENCH, vec![kg(100.0, 10), kg(100.0, 8)]);

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        let last = history.last_performed.as_ref().unwrap();
        assert_eq!(last.session_id, 42);
        assert_eq!(last.date, day(15));
        assert_eq!(last.sets, vec![kg(100.0, 10), kg(100.0, 8)]);
        assert_eq!(last.max_weight, 100.0);
        assert_eq!(last.total_volume, 1800.0);

        let suggestion = history.progression_suggestion.as_ref().unwrap();
        assert_eq!(suggestion.recommended_weight, 102.5);
        assert_eq!(suggestion.recommended_reps, 10);
        assert!(suggestion.rationale.contains("increase weight"));

        assert_eq!(history.recent_sessions.len(), 1);
        assert_eq!(history.recent_sessions[0].best_set, kg(100.0, 10));
    }

    #[tokio::test]
    async fn personal_best_scans_full_history() {
        let mut source = MemorySource::with_exercises(&[BENCH]);
        source.log(1, ALICE, day(1), BENCH, vec![kg(100.0, 10)]);
        source.log(2, ALICE, day(8), BENCH, vec![kg(120.0, 5)]);
        source.log(3, ALICE, day(15), BENCH, vec![kg(80.0, 6)]);

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        let best = history.personal_best.unwrap();
        assert_eq!(best.weight, 120.0);
        assert_eq!(best.reps, 5);
        assert_eq!(best.session_id, 2);
        assert_eq!(best.date, day(8));
        assert!(best.estimated_1rm > 130.0);

        // Suggestion comes from the latest session only.
        let suggestion = history.progression_suggestion.unwrap();
        assert_eq!(suggestion.recommended_weight, 80.0);
        assert_eq!(suggestion.recommended_reps, 7);
    }

    #[tokio::test]
    async fn tied_dates_resolve_to_higher_session_id() {
        let mut source = MemorySource::with_exercises(&[BENCH]);
        source.log(11, ALICE, day(3), BENCH, vec![kg(60.0, 5)]);
        source.log(12, ALICE, day(3), BENCH, vec![kg(70.0, 5)]);

        for _ in 0..3 {
            let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();
            assert_eq!(history.last_performed.unwrap().session_id, 12);
            let ids: Vec<i64> = history.recent_sessions.iter().map(|s| s.session_id).collect();
            assert_eq!(ids, vec![12, 11]);
        }
    }

    #[tokio::test]
    async fn recent_sessions_keep_newest_five() {
        let mut source = MemorySource::with_exercises(&[BENCH]);
        for id in 1..=7 {
            source.log(id, ALICE, day(id as u32), BENCH, vec![kg(50.0 + id as f64, 8)]);
        }

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        let ids: Vec<i64> = history.recent_sessions.iter().map(|s| s.session_id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn other_users_sets_never_leak() {
        let mut source = MemorySource::with_exercises(&[BENCH]);
        source.log(1, ALICE, day(1), BENCH, vec![kg(60.0, 8)]);
        source.log(2, BOB, day(2), BENCH, vec![kg(200.0, 3)]);

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        assert_eq!(history.last_performed.as_ref().unwrap().session_id, 1);
        assert_eq!(history.personal_best.as_ref().unwrap().weight, 60.0);
        assert!(history.recent_sessions.iter().all(|s| s.session_id == 1));

        let bob = get_exercise_history(&source, BENCH, BOB).await.unwrap();
        assert_eq!(bob.personal_best.unwrap().weight, 200.0);
    }

    #[tokio::test]
    async fn other_exercises_in_same_session_are_ignored() {
        let mut source = MemorySource::with_exercises(&[BENCH, SQUAT]);
        source.sessions.push(LoggedSession {
            id: 1,
            user_id: ALICE,
            date: day(1),
            exercises: vec![(SQUAT, vec![kg(180.0, 5)]), (BENCH, vec![kg(90.0, 6)])],
        });

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        assert_eq!(history.last_performed.unwrap().sets, vec![kg(90.0, 6)]);
        assert_eq!(history.personal_best.unwrap().weight, 90.0);
    }

    #[tokio::test]
    async fn stack_sets_progress_by_one_stack() {
        let mut source = MemorySource::with_exercises(&[BENCH]);
        let stacks = SetSummary {
            weight: 10.0,
            reps: 10,
            unit: SetUnit::Stacks,
        };
        source.log(1, ALICE, day(1), BENCH, vec![stacks]);

        let history = get_exercise_history(&source, BENCH, ALICE).await.unwrap();

        let suggestion = history.progression_suggestion.unwrap();
        assert_eq!(suggestion.recommended_weight, 11.0);
        assert_eq!(suggestion.recommended_reps, 10);
        assert!(suggestion.rationale.contains("1 stack"));
    }

    #[test]
    fn personal_best_tie_prefers_earliest_session() {
        // Newest first, as delivered by a source. 100x1 == 100x1 on 1RM.
        let rows = vec![
            HistoryRow {
                weight: 100.0,
                reps: 1,
                unit: SetUnit::Kg,
                date: day(9),
                session_id: 9,
            },
            HistoryRow {
                weight: 100.0,
                reps: 1,
                unit: SetUnit::Kg,
                date: day(2),
                session_id: 2,
            },
        ];

        let history = build_history(BENCH, &rows);

        assert_eq!(history.personal_best.unwrap().session_id, 2);
        assert_eq!(history.last_performed.unwrap().session_id, 9);
    }

    #[test]
    fn personal_best_tie_within_session_keeps_first_set() {
        let row = |reps| HistoryRow {
            weight: 100.0,
            reps,
            unit: SetUnit::Kg,
            date: day(4),
            session_id: 4,
        };
        // 100x1 and 100x37 both estimate to 100.
        let rows = vec![row(37), row(1)];

        let best = build_history(BENCH, &rows).personal_best.unwrap();

        assert_eq!(best.reps, 37);
        assert_eq!(best.estimated_1rm, 100.0);
    }

    #[test]
    fn empty_history_serializes_nulls_and_empty_list() {
        let json = serde_json::to_value(ExerciseHistory::empty(3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "exercise_id": 3,
                "last_performed": null,
                "personal_best": null,
                "recent_sessions": [],
                "progression_suggestion": null,
            })
        );
    }

    #[test]
    fn dates_serialize_as_iso_8601() {
        let rows = vec![HistoryRow {
            weight: 100.0,
            reps: 5,
            unit: SetUnit::Kg,
            date: day(15),
            session_id: 42,
        }];

        let json = serde_json::to_value(build_history(BENCH, &rows)).unwrap();

        assert_eq!(json["last_performed"]["date"], "2025-10-15T10:30:00Z");
        assert_eq!(json["personal_best"]["date"], "2025-10-15T10:30:00Z");
    }
}
