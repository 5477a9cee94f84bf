use axum::routing::get;
use axum::{Json, Router, extract::State};
use serde::Deserialize;

use overload_core::error::ApiError;
use overload_core::history::{ExerciseHistory, get_exercise_history};

use crate::error::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/exercises/{exercise_id}/history", get(get_history))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// User to get history for
    pub user_id: i64,
}

/// Get a user's performance history for an exercise
///
/// Includes the most recent session, the personal best (highest estimated
/// 1RM), the last five sessions and a progressive-overload suggestion for
/// the next session. A user with no logged sets gets null/empty fields.
#[utoipa::path(
    get,
    path = "/v1/exercises/{exercise_id}/history",
    params(
        ("exercise_id" = i64, Path, description = "Exercise ID"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "History for this exercise and user", body = ExerciseHistory),
        (status = 400, description = "Malformed exercise id or user_id", body = ApiError),
        (status = 404, description = "Exercise not found", body = ApiError)
    ),
    tag = "exercises"
)]
pub async fn get_history(
    State(state): State<AppState>,
    AppPath(exercise_id): AppPath<i64>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<ExerciseHistory>, AppError> {
    let store = state.history_store();
    let history = get_exercise_history(&store, exercise_id, query.user_id).await?;

    tracing::debug!(
        exercise_id,
        user_id = query.user_id,
        sessions = history.recent_sessions.len(),
        has_history = history.last_performed.is_some(),
        "exercise history computed"
    );

    Ok(Json(history))
}
