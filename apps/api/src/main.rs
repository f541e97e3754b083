use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::config::{Config, ExtractionConfig};
use api::db::create_pool;
use api::extract::entities::{DisabledEntityExtractor, EntityExtractor, HttpNerExtractor};
use api::query::engine::QueryEngine;
use api::routes::build_router;
use api::state::AppState;
use api::storage::postgres::PgResumeStore;
use api::storage::ResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;
    let extraction = ExtractionConfig::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Extraction config: {} skills in vocabulary, name window {}",
        extraction.skill_vocab.len(),
        extraction.name_window
    );

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Entity extraction backend: HTTP service when configured, otherwise
    // the pipeline runs on line heuristics alone.
    let ner: Arc<dyn EntityExtractor> = match &config.ner_endpoint {
        Some(endpoint) => {
            info!("NER backend: {endpoint}");
            Arc::new(HttpNerExtractor::new(endpoint.clone()))
        }
        None => {
            info!("NER backend: disabled");
            Arc::new(DisabledEntityExtractor)
        }
    };

    let store: Arc<dyn ResumeStore> = Arc::new(PgResumeStore::new(db));

    // Build app state
    let state = AppState {
        engine: QueryEngine::new(store.clone()),
        store,
        ner,
        extraction: Arc::new(extraction),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
