use kindlezap_core::Config;
use kindlezap_processing::{DocumentConverter, PreviewRenderer};
use kindlezap_services::{Mailer, Summarizer};
use kindlezap_storage::TempStorage;
use std::sync::Arc;

/// Shared, read-only application state. Every request owns its own temporary files.
pub struct AppState {
    pub config: Config,
    pub storage: TempStorage,
    pub converter: Arc<dyn DocumentConverter>,
    pub preview: PreviewRenderer,
    pub summarizer: Arc<dyn Summarizer>,
    pub mailer: Arc<dyn Mailer>,
}
