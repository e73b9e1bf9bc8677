mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod prompts;
mod routes;
mod services;

use anyhow::Result;

use services::{CompletionGateway, ExportadorClient, RedisCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting Advogado Virtual backend"
    );

    // Create database pool
    let pool = db::create_pool(&settings).await?;

    // Create Redis cache
    let cache = RedisCache::new(&settings.redis_url, settings.redis_cache_ttl_seconds).await?;

    // Completion gateway initializes lazily: an instance without LLM
    // credentials still serves every non-AI route.
    let completion = CompletionGateway::new(settings.llm.clone());
    if settings.llm.api_key.is_none() {
        tracing::warn!("LLM_API_KEY not set - AI routes will fail with MISSING_CREDENTIALS");
    }

    // Create export renderer client
    let exportador = ExportadorClient::new(
        &settings.exportador_url,
        &settings.exportador_token,
        settings.exportador_timeout_seconds,
    )?;

    // Optionally check renderer health (non-blocking)
    tokio::spawn({
        let exportador = exportador.clone();
        async move {
            match exportador.health_check().await {
                Ok(()) => tracing::info!("Export renderer is healthy"),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Export renderer health check failed - will retry on first request"
                ),
            }
        }
    });

    // Create JWKS cache for JWT verification
    let jwks_cache = auth::JwksCache::new(
        settings.jwt_jwks_url.clone(),
        settings.jwt_issuer.clone(),
        settings.jwt_audience.clone(),
        settings.jwks_cache_ttl_seconds,
    );

    // Optionally warm the JWKS cache
    if let Err(e) = jwks_cache.warm_cache().await {
        tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
    }

    // Build application
    let app = app::create_app(std::sync::Arc::new(app::AppState {
        db: pool,
        settings: settings.clone(),
        jwks_cache,
        cache,
        completion,
        exportador,
    }));

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
