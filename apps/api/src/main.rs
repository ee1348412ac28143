mod config;
mod db;
mod errors;
mod generation;
mod listings;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::cache::{DescriptionCache, InMemoryDescriptionCache, RedisDescriptionCache};
use crate::generation::generator::DescriptionGenerator;
use crate::listings::store::PgListingStore;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Listings API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize description cache (Redis when configured, in-process otherwise)
    let cache: Arc<dyn DescriptionCache> = match &config.redis_url {
        Some(url) => {
            let redis = RedisDescriptionCache::connect(url).await?;
            info!("Redis description cache initialized");
            Arc::new(redis)
        }
        None => {
            warn!("REDIS_URL not set; caching descriptions in-process");
            Arc::new(InMemoryDescriptionCache::new())
        }
    };

    // Initialize completion client
    let llm = LlmClient::new(LlmSettings {
        api_key: config.openai_api_key.clone(),
        base_url: config.openai_base_url.clone(),
        model: config.openai_model.clone(),
        style: config.openai_api_style,
    })?;
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY not set; every description will use the local fallback");
    }
    info!(
        "Completion client initialized (style: {:?}, model: {})",
        llm.settings().style,
        llm.settings().effective_model()
    );

    // Build app state
    let state = AppState {
        listings: Arc::new(PgListingStore::new(db)),
        cache: cache.clone(),
        generator: DescriptionGenerator::new(Arc::new(llm), cache),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
