use std::sync::Arc;

use crate::llm_client::LanguageModel;
use crate::store::RoadmapStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Local chat model. Default: `OllamaClient`.
    pub llm: Arc<dyn LanguageModel>,
    /// Roadmap persistence. Default: `PgRoadmapStore`.
    pub store: Arc<dyn RoadmapStore>,
}
