use crate::util::{OutputFormat, api_request};

pub fn history_path(exercise_id: i64) -> String {
    format!("/v1/exercises/{exercise_id}/history")
}

/// Fetch a user's history and progression suggestion for one exercise.
pub async fn run(api_url: &str, exercise_id: i64, user_id: i64, format: OutputFormat) -> i32 {
    let query = [("user_id".to_string(), user_id.to_string())];
    api_request(api_url, &history_path(exercise_id), &query, format).await
}
