//! Uploaded document domain types
//!
//! Binary content lives in the external object store; this side only tracks
//! the storage path, the best-effort extracted text and a classification tag.
//! Documents are never mutated after upload.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentoResponse {
    pub id: Uuid,
    pub atendimento_id: Uuid,
    pub nome_original: String,
    pub caminho_arquivo: String,
    pub classificacao: Option<String>,
    /// Whether text extraction produced anything usable for prompts.
    pub tem_texto: bool,
    pub created_at: DateTime<Utc>,
}
