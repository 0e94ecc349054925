//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use parichay_core::QrPipeline;

/// Application state containing shared resources.
///
/// The pipeline is immutable configuration; every request runs it with
/// per-call data, so a single shared instance serves all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The decode/verify pipeline
    pub pipeline: Arc<QrPipeline>,
}

impl AppState {
    pub fn new(pipeline: QrPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(QrPipeline::default())
    }
}
