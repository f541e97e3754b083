//! The NLP capability boundary. Any backend that can turn text into typed
//! entity spans is substitutable behind `EntityExtractor`; the pipeline
//! never binds to a concrete model runtime.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Entity label taxonomy. Backends emit upper-case tags (`PERSON`, `ORG`,
/// ...); anything unrecognized folds to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Person,
    Org,
    Location,
    Date,
    #[serde(other)]
    Other,
}

/// A labeled substring identified by the NLP backend. Offsets index into
/// the exact text handed to `extract`. Read-only input to the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: EntityLabel,
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Backends without confidence scores get full confidence.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

/// The entity-extraction capability. Carried in `AppState` as
/// `Arc<dyn EntityExtractor>`, swapped at startup via `NER_ENDPOINT`.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, AppError>;
}

/// No-op backend used when no NER endpoint is configured. The resolver
/// then falls back to its line heuristics for the name field.
pub struct DisabledEntityExtractor;

#[async_trait]
impl EntityExtractor for DisabledEntityExtractor {
    async fn extract(&self, _text: &str) -> Result<Vec<EntitySpan>, AppError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

/// HTTP-backed entity extractor. POSTs `{ "text": ... }` to the configured
/// endpoint and expects a JSON array of spans back.
///
/// The request is bounded by a timeout and is NOT retried here; a timed
/// out or failed extraction surfaces to the caller, who decides whether to
/// resubmit the document.
#[derive(Clone)]
pub struct HttpNerExtractor {
    client: Client,
    endpoint: String,
}

const NER_TIMEOUT_SECS: u64 = 30;

impl HttpNerExtractor {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(NER_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl EntityExtractor for HttpNerExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NerRequest { text })
            .send()
            .await
            .map_err(|e| AppError::Ner(format!("entity service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Ner(format!(
                "entity service returned {status}: {body}"
            )));
        }

        response
            .json::<Vec<EntitySpan>>()
            .await
            .map_err(|e| AppError::Ner(format!("entity service returned malformed spans: {e}")))
    }
}
