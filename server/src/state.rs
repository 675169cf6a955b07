//! Application state shared across all route handlers.

use std::sync::Arc;

use logistics_nlu_lib::LogisticsNluEngine;

/// Shared application state, cheap to clone across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// The loaded NLU engine; parsing is read-only and lock free.
    pub engine: Arc<LogisticsNluEngine>,
}

impl AppState {
    pub fn new(engine: LogisticsNluEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
