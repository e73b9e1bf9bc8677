//! Health endpoint, the one route without authentication.
//!
//! Postgres down means unhealthy; Redis down only degrades template reads,
//! so the instance stays in rotation.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub database: &'static str,
    pub redis: &'static str,
}

fn probe(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

/// GET /health
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (db_result, redis_result) = tokio::join!(
        db::ping(&state.db),
        state.cache.health_check(),
    );
    let (db_ok, redis_ok) = (db_result.is_ok(), redis_result.is_ok());

    let (status, code) = match (db_ok, redis_ok) {
        (true, true) => ("healthy", StatusCode::OK),
        (true, false) => ("degraded", StatusCode::OK),
        (false, _) => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            services: ServiceHealth {
                database: probe(db_ok),
                redis: probe(redis_ok),
            },
        }),
    )
}
