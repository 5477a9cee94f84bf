use chrono::{DateTime, Utc};
use overload_core::history::{HistoryRow, HistorySource};
use overload_core::sets::SetUnit;
use sqlx::PgPool;

/// Postgres-backed reader for exercise history.
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct SetHistoryRow {
    weight: f64,
    reps: i32,
    unit: String,
    performed_at: DateTime<Utc>,
    session_id: i64,
}

impl TryFrom<SetHistoryRow> for HistoryRow {
    type Error = sqlx::Error;

    fn try_from(row: SetHistoryRow) -> Result<Self, Self::Error> {
        let unit = row
            .unit
            .parse::<SetUnit>()
            .map_err(|msg| sqlx::Error::Decode(msg.into()))?;
        Ok(HistoryRow {
            weight: row.weight,
            reps: row.reps,
            unit,
            date: row.performed_at,
            session_id: row.session_id,
        })
    }
}

impl HistorySource for PgHistoryStore {
    type Error = sqlx::Error;

    async fn exercise_exists(&self, exercise_id: i64) -> Result<bool, Self::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM exercises WHERE id = $1)")
            .bind(exercise_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn history_rows(
        &self,
        exercise_id: i64,
        user_id: i64,
    ) -> Result<Vec<HistoryRow>, Self::Error> {
        // Template entries carry template_id and no session_id, so the inner
        // join on sessions drops them.
        let rows = sqlx::query_as::<_, SetHistoryRow>(
            r#"
            SELECT s.weight, s.reps, s.unit, ws.performed_at, ws.id AS session_id
            FROM sets s
            JOIN exercise_sessions es ON es.id = s.exercise_session_id
            JOIN sessions ws ON ws.id = es.session_id
            WHERE es.exercise_id = $1 AND ws.user_id = $2
            ORDER BY ws.performed_at DESC, ws.id DESC, es.position ASC NULLS LAST, es.id ASC,
                     s.position ASC NULLS LAST, s.id ASC
            "#,
        )
        .bind(exercise_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::try_from).collect()
    }
}
