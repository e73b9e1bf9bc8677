//! Intake (atendimento) routes
//!
//! Case intake lifecycle: creation, listing, transcript updates. Every
//! statement filters by the caller's escritório; a cross-tenant id behaves
//! exactly like a missing one.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::atendimentos::{
    AreaJuridica, AtendimentoResponse, CreateAtendimentoRequest, ModoInput,
    UpdateTranscricaoRequest,
};
use crate::domain::documentos::DocumentoResponse;
use crate::error::{ApiError, CampoInvalido};
use crate::prompts::DocumentoApoio;

/// Database row for atendimento
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AtendimentoRow {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub area: String,
    pub tipo_servico: Option<String>,
    pub modo_input: String,
    pub transcricao: String,
    pub pedido_especifico: Option<String>,
    pub analise_previa: Option<String>,
    pub fatos_extraidos: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AtendimentoRow {
    pub(crate) fn area(&self) -> AreaJuridica {
        AreaJuridica::parse(&self.area).unwrap_or(AreaJuridica::Civel)
    }

    fn into_response(self, documentos: Vec<DocumentoResponse>) -> AtendimentoResponse {
        let area = self.area();
        AtendimentoResponse {
            id: self.id,
            cliente_id: self.cliente_id,
            area,
            tipo_servico: self.tipo_servico,
            modo_input: ModoInput::parse(&self.modo_input).unwrap_or(ModoInput::Texto),
            transcricao: self.transcricao,
            pedido_especifico: self.pedido_especifico,
            analise_previa: self.analise_previa,
            fatos_extraidos: self.fatos_extraidos,
            documentos,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentoRow {
    id: Uuid,
    atendimento_id: Uuid,
    nome_original: String,
    caminho_arquivo: String,
    classificacao: Option<String>,
    texto_extraido: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DocumentoRow> for DocumentoResponse {
    fn from(row: DocumentoRow) -> Self {
        Self {
            id: row.id,
            atendimento_id: row.atendimento_id,
            nome_original: row.nome_original,
            caminho_arquivo: row.caminho_arquivo,
            classificacao: row.classificacao,
            tem_texto: row
                .texto_extraido
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty()),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct CriadoResponse {
    id: Uuid,
}

/// Load an intake scoped to the caller's tenant.
pub(crate) async fn carregar_atendimento(
    db: &PgPool,
    escritorio_id: Uuid,
    atendimento_id: Uuid,
) -> Result<AtendimentoRow, ApiError> {
    sqlx::query_as::<_, AtendimentoRow>(
        r#"
        SELECT id, cliente_id, area, tipo_servico, modo_input, transcricao,
               pedido_especifico, analise_previa, fatos_extraidos, created_at, updated_at
        FROM atendimentos
        WHERE id = $1 AND escritorio_id = $2
        "#,
    )
    .bind(atendimento_id)
    .bind(escritorio_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::not_found("Atendimento não encontrado"))
}

/// Load an intake's attached documents in prompt-ready form.
pub(crate) async fn carregar_documentos_apoio(
    db: &PgPool,
    escritorio_id: Uuid,
    atendimento_id: Uuid,
) -> Result<Vec<DocumentoApoio>, ApiError> {
    let linhas: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
        r#"
        SELECT nome_original, classificacao, texto_extraido
        FROM documentos
        WHERE atendimento_id = $1 AND escritorio_id = $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(atendimento_id)
    .bind(escritorio_id)
    .fetch_all(db)
    .await?;

    Ok(linhas
        .into_iter()
        .map(|(nome, classificacao, texto)| DocumentoApoio {
            nome,
            classificacao,
            texto: texto.unwrap_or_default(),
        })
        .collect())
}

/// POST /atendimentos
///
/// Create an intake for a client of the caller's office.
pub async fn create_atendimento(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<CreateAtendimentoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The client must belong to the same office; anything else is a 404,
    // never a hint that the id exists elsewhere.
    let cliente_existe: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM clientes WHERE id = $1 AND escritorio_id = $2)",
    )
    .bind(req.cliente_id)
    .bind(auth.escritorio_id)
    .fetch_one(&state.db)
    .await?;

    if !cliente_existe {
        return Err(ApiError::not_found("Cliente não encontrado"));
    }

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO atendimentos
            (id, escritorio_id, cliente_id, area, tipo_servico, modo_input,
             transcricao, criado_por, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, '', $7, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.escritorio_id)
    .bind(req.cliente_id)
    .bind(req.area.as_str())
    .bind(&req.tipo_servico)
    .bind(req.modo_input.as_str())
    .bind(auth.user_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(CriadoResponse { id })))
}

/// GET /atendimentos
///
/// Paginated intake list for the caller's office.
pub async fn list_atendimentos(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM atendimentos WHERE escritorio_id = $1")
        .bind(auth.escritorio_id)
        .fetch_one(&state.db)
        .await?;

    let linhas = sqlx::query_as::<_, AtendimentoRow>(
        r#"
        SELECT id, cliente_id, area, tipo_servico, modo_input, transcricao,
               pedido_especifico, analise_previa, fatos_extraidos, created_at, updated_at
        FROM atendimentos
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

    let data: Vec<AtendimentoResponse> = linhas
        .into_iter()
        .map(|row| row.into_response(Vec::new()))
        .collect();

    Ok(Paginated::new(data, &pagination, total as u64))
}

/// GET /atendimentos/:atendimento_id
///
/// Full intake record with attached document metadata.
pub async fn get_atendimento(
    State(state): State<Arc<AppState>>,
    Path(atendimento_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = carregar_atendimento(&state.db, auth.escritorio_id, atendimento_id).await?;

    let documentos = sqlx::query_as::<_, DocumentoRow>(
        r#"
        SELECT id, atendimento_id, nome_original, caminho_arquivo, classificacao,
               texto_extraido, created_at
        FROM documentos
        WHERE atendimento_id = $1 AND escritorio_id = $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(atendimento_id)
    .bind(auth.escritorio_id)
    .fetch_all(&state.db)
    .await?;

    let documentos: Vec<DocumentoResponse> = documentos.into_iter().map(Into::into).collect();

    Ok(Json(DataResponse::new(row.into_response(documentos))))
}

/// PUT /atendimentos/:atendimento_id/transcricao
///
/// Replace the transcript (manual edit or re-transcription). Intakes stay
/// editable even after pieces were generated from them.
pub async fn update_transcricao(
    State(state): State<Arc<AppState>>,
    Path(atendimento_id): Path<Uuid>,
    auth: RequireAuth,
    Json(req): Json<UpdateTranscricaoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.transcricao.trim().is_empty() {
        return Err(ApiError::validation(
            "Payload inválido",
            vec![CampoInvalido::new("transcricao", "não pode ser vazia")],
        ));
    }

    let row = sqlx::query_as::<_, AtendimentoRow>(
        r#"
        UPDATE atendimentos SET
            transcricao = $3,
            pedido_especifico = COALESCE($4, pedido_especifico),
            updated_at = NOW()
        WHERE id = $1 AND escritorio_id = $2
        RETURNING id, cliente_id, area, tipo_servico, modo_input, transcricao,
                  pedido_especifico, analise_previa, fatos_extraidos, created_at, updated_at
        "#,
    )
    .bind(atendimento_id)
    .bind(auth.escritorio_id)
    .bind(&req.transcricao)
    .bind(&req.pedido_especifico)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Atendimento não encontrado"))?;

    Ok(Json(DataResponse::new(row.into_response(Vec::new()))))
}
