//! Tenant document-template routes
//!
//! One template per (escritório, piece type). Reads are the one hot static
//! lookup in the pipeline and go through Redis; the upsert invalidates the
//! cached entry.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::modelos::{ModeloDocumentoResponse, ModeloEnvelope, UpsertModeloRequest};
use crate::domain::pecas::TipoPeca;
use crate::error::{ApiError, CampoInvalido};
use crate::services::cache::keys;

fn parse_tipo(tipo: &str) -> Result<TipoPeca, ApiError> {
    TipoPeca::parse(tipo)
        .ok_or_else(|| ApiError::bad_request(format!("Tipo de peça desconhecido: {tipo}")))
}

/// GET /modelos/:tipo
pub async fn get_modelo(
    State(state): State<Arc<AppState>>,
    Path(tipo): Path<String>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let tipo = parse_tipo(&tipo)?;

    let cache_key = keys::modelo(auth.escritorio_id, tipo);
    if let Some(cached) = state.cache.get::<ModeloEnvelope>(&cache_key).await {
        return Ok(Json(cached));
    }

    let linha: Option<(String, DateTime<Utc>)> = sqlx::query_as(
        "SELECT conteudo, updated_at FROM modelos_documento \
         WHERE escritorio_id = $1 AND tipo = $2",
    )
    .bind(auth.escritorio_id)
    .bind(tipo.as_str())
    .fetch_optional(&state.db)
    .await?;

    let envelope = ModeloEnvelope {
        template: linha.map(|(conteudo, updated_at)| ModeloDocumentoResponse {
            tipo,
            conteudo,
            updated_at,
        }),
    };

    if let Err(e) = state.cache.set(&cache_key, &envelope).await {
        tracing::warn!(error = %e, "Failed to cache document template");
    }

    Ok(Json(envelope))
}

/// POST /modelos/:tipo
pub async fn upsert_modelo(
    State(state): State<Arc<AppState>>,
    Path(tipo): Path<String>,
    auth: RequireAuth,
    Json(req): Json<UpsertModeloRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tipo = parse_tipo(&tipo)?;

    if req.conteudo.trim().is_empty() {
        return Err(ApiError::validation(
            "Payload inválido",
            vec![CampoInvalido::new("conteudo", "não pode ser vazio")],
        ));
    }

    let (conteudo, updated_at): (String, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO modelos_documento (id, escritorio_id, tipo, conteudo, updated_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (escritorio_id, tipo)
        DO UPDATE SET conteudo = EXCLUDED.conteudo, updated_at = NOW()
        RETURNING conteudo, updated_at
        "#,
    )
    .bind(uuid::Uuid::new_v4())
    .bind(auth.escritorio_id)
    .bind(tipo.as_str())
    .bind(&req.conteudo)
    .fetch_one(&state.db)
    .await?;

    let cache_key = keys::modelo(auth.escritorio_id, tipo);
    if let Err(e) = state.cache.delete(&cache_key).await {
        tracing::warn!(error = %e, "Failed to invalidate template cache");
    }

    Ok(Json(ModeloEnvelope {
        template: Some(ModeloDocumentoResponse {
            tipo,
            conteudo,
            updated_at,
        }),
    }))
}
