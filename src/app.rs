use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::JwksCache;
use crate::config::Settings;
use crate::middleware::{request_id_layer, x_request_id};
use crate::routes;
use crate::services::{CompletionGateway, ExportadorClient, RedisCache};

/// Shared application state, one instance behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Settings,
    pub jwks_cache: JwksCache,
    pub cache: RedisCache,
    pub completion: CompletionGateway,
    pub exportador: ExportadorClient,
}

/// Assemble the router and the middleware stack around it.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.settings);
    let (set_request_id, propagate_request_id) = request_id_layer();

    // Spans at DEBUG keep the INFO logs readable under load.
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Layers apply bottom-up: the request id exists before tracing sees it.
    Router::new()
        .merge(routes::api_router())
        .layer(propagate_request_id)
        .layer(trace)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Longer preflight cache in dev cuts down on OPTIONS noise.
    let max_age = if settings.env.is_dev() { 86400 } else { 3600 };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            x_request_id(),
        ]))
        .allow_credentials(true)
        .max_age(Duration::from_secs(max_age))
}
