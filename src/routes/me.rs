//! Session profile route

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub nome: String,
    pub email: Option<String>,
    pub papel: &'static str,
    pub escritorio_id: Uuid,
    pub escritorio_nome: String,
}

/// GET /me
///
/// Profile of the authenticated user, with the office they belong to.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row: Option<(String, Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT p.nome, p.email, e.nome
        FROM perfis p
        JOIN escritorios e ON e.id = p.escritorio_id
        WHERE p.id = $1 AND p.escritorio_id = $2
        "#,
    )
    .bind(auth.user_id)
    .bind(auth.escritorio_id)
    .fetch_optional(&state.db)
    .await?;

    let (nome, email, escritorio_nome) =
        row.ok_or_else(|| ApiError::not_found("Perfil não encontrado"))?;

    Ok(Json(DataResponse::new(MeResponse {
        id: auth.user_id,
        nome,
        // Profile email can lag; the verified token is the fallback.
        email: email.or_else(|| auth.email.clone()),
        papel: auth.papel.as_str(),
        escritorio_id: auth.escritorio_id,
        escritorio_nome,
    })))
}
