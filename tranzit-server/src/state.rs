use std::sync::Arc;

use tokio::sync::Semaphore;
use tranzit_core::TransitModel;

/// Shared application state, cheap to clone into every handler
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<TransitModel>,
    /// Permits for queries running on the blocking pool
    pub query_permits: Arc<Semaphore>,
}

impl AppState {
    /// State allowing at most `max_queries` routing queries at once
    pub fn new(model: TransitModel, max_queries: usize) -> Self {
        Self {
            model: Arc::new(model),
            query_permits: Arc::new(Semaphore::new(max_queries.max(1))),
        }
    }
}
