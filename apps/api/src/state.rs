use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::extract::entities::EntityExtractor;
use crate::query::engine::QueryEngine;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum
/// extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store. Append-only; the query engine reads through it too.
    pub store: Arc<dyn ResumeStore>,
    /// Pluggable NLP backend. Swapped at startup via NER_ENDPOINT.
    pub ner: Arc<dyn EntityExtractor>,
    pub engine: QueryEngine,
    pub extraction: Arc<ExtractionConfig>,
}
