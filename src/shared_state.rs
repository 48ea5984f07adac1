use std::sync::Arc;
use std::time::Instant;

use crate::db::QuoteRepository;

#[derive(Clone)]
pub struct AppState {
    /// Injected quote persistence
    pub store: Arc<dyn QuoteRepository>,
    /// Upper bound for `limit` on quote listings
    pub max_list_limit: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn QuoteRepository>, max_list_limit: usize) -> Self {
        Self {
            store,
            max_list_limit,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
