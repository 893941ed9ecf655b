use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    db::{PgDailyMovieStore, PgGameStore},
    services::{providers::MetadataProvider, DailySelector, GuessScorer},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<DailySelector>,
    pub scorer: Arc<GuessScorer>,
}

impl AppState {
    /// Wires the stores and services around the pool and the injected
    /// metadata provider.
    pub fn new(pool: PgPool, provider: Arc<dyn MetadataProvider>) -> Self {
        let daily_store = Arc::new(PgDailyMovieStore::new(pool.clone()));
        let game_store = Arc::new(PgGameStore::new(pool));

        Self {
            selector: Arc::new(DailySelector::new(daily_store.clone(), provider)),
            scorer: Arc::new(GuessScorer::new(game_store, daily_store)),
        }
    }
}
