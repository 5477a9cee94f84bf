//! Custom extractors that convert axum rejections to structured AppError responses.
//!
//! Use `AppQuery<T>` / `AppPath<T>` as drop-in replacements for `axum::extract::Query`
//! and `axum::extract::Path`. Unlike the standard extractors, failures produce a JSON
//! `AppError` instead of axum's default plain-text response.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;

use crate::error::AppError;

/// Query-string extractor that reports deserialization errors as `AppError::Validation`.
pub struct AppQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => {
                let body_text = rejection.body_text();
                let field = extract_field_from_serde_message(&body_text)
                    .unwrap_or_else(|| "query".to_string());
                Err(AppError::Validation {
                    message: format!("Invalid query string: {body_text}"),
                    field: Some(field),
                    received: parts
                        .uri
                        .query()
                        .map(|q| serde_json::Value::String(q.to_string())),
                    docs_hint: Some(
                        "Check the query parameters against the endpoint's schema (GET /api-doc/openapi.json)."
                            .to_string(),
                    ),
                })
            }
        }
    }
}

/// Path extractor that reports malformed segments as `AppError::Validation`.
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(AppPath(value)),
            Err(rejection) => Err(AppError::Validation {
                message: format!("Invalid path: {}", rejection.body_text()),
                field: Some("path".to_string()),
                received: Some(serde_json::Value::String(parts.uri.path().to_string())),
                docs_hint: None,
            }),
        }
    }
}

/// Try to extract a field name from serde's error messages.
fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    // "missing field `user_id`" / "unknown field `foo`"
    for pattern in ["missing field `", "unknown field `"] {
        if let Some(start) = msg.find(pattern) {
            let after = &msg[start + pattern.len()..];
            if let Some(end) = after.find('`') {
                return Some(after[..end].to_string());
            }
        }
    }
    // "user_id: invalid digit found in string"
    if let Some(colon) = msg.rfind(": ") {
        let head = &msg[..colon];
        let candidate = head.rsplit(' ').next().unwrap_or(head);
        let follows_colon = head.ends_with(&format!(": {candidate}"));
        if follows_colon
            && !candidate.is_empty()
            && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Some(candidate.to_string());
        }
    }
    None
}
