//! Stdio tool server over the resume store. Exposes the read-only query
//! operations as MCP tools; stdout is the protocol channel, so all
//! logging goes to stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::config::Config;
use api::db::create_pool;
use api::mcp::McpServer;
use api::query::engine::QueryEngine;
use api::storage::postgres::PgResumeStore;
use api::storage::ResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume-mcp v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn ResumeStore> = Arc::new(PgResumeStore::new(db));

    let mut server = McpServer::new(QueryEngine::new(store));
    server.run_stdio().await
}
