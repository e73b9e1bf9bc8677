//! Usage log routes
//!
//! Office admins can read the append-only completion usage log for billing
//! review. Nothing here mutates it.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::{Papel, RequireAuth};
use crate::domain::uso::RegistroUsoResponse;
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct RegistroUsoRow {
    id: Uuid,
    usuario_id: Uuid,
    endpoint: String,
    modelo: String,
    tokens_entrada: i32,
    tokens_saida: i32,
    custo_estimado: Decimal,
    latencia_ms: i64,
    created_at: DateTime<Utc>,
}

impl From<RegistroUsoRow> for RegistroUsoResponse {
    fn from(row: RegistroUsoRow) -> Self {
        Self {
            id: row.id,
            usuario_id: row.usuario_id,
            endpoint: row.endpoint,
            modelo: row.modelo,
            tokens_entrada: row.tokens_entrada,
            tokens_saida: row.tokens_saida,
            custo_estimado: row.custo_estimado,
            latencia_ms: row.latencia_ms,
            created_at: row.created_at,
        }
    }
}

/// GET /uso
///
/// Paginated usage log for the caller's office. Admin only.
pub async fn list_uso(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    if auth.papel != Papel::Admin {
        return Err(ApiError::forbidden(
            "Apenas administradores podem consultar o uso",
        ));
    }

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM registros_uso WHERE escritorio_id = $1")
            .bind(auth.escritorio_id)
            .fetch_one(&state.db)
            .await?;

    let linhas = sqlx::query_as::<_, RegistroUsoRow>(
        r#"
        SELECT id, usuario_id, endpoint, modelo, tokens_entrada, tokens_saida,
               custo_estimado, latencia_ms, created_at
        FROM registros_uso
        WHERE escritorio_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(auth.escritorio_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    let data: Vec<RegistroUsoResponse> = linhas.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &pagination, total as u64))
}
