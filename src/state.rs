use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::assess::PipelineSession;
use crate::core::cancel::CancellationToken;
use crate::core::config::AppConfig;
use crate::history::AssessmentHistory;

/// Global application state shared across all routes.
///
/// The pipeline session is rebuilt on every dataset load and read-shared
/// across assessment requests; history is session-scoped and in-memory.
pub struct AppState {
    pub config: AppConfig,
    pub session: RwLock<Option<PipelineSession>>,
    pub history: RwLock<AssessmentHistory>,
    /// Token for the assessment currently in flight, replaced per run.
    pub active_run: Mutex<CancellationToken>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(AppState {
            config,
            session: RwLock::new(None),
            history: RwLock::new(AssessmentHistory::new()),
            active_run: Mutex::new(CancellationToken::new()),
        })
    }
}
