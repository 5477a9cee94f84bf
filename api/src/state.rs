use sqlx::PgPool;

use crate::store::PgHistoryStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

impl AppState {
    pub fn history_store(&self) -> PgHistoryStore {
        PgHistoryStore::new(self.db.clone())
    }
}
