//! Tenant document-template domain types
//!
//! Each escritório can store one template per piece type; the generation
//! prompts embed it so output follows the office's house style.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::pecas::TipoPeca;

/// Request DTO for upserting a template
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertModeloRequest {
    pub conteudo: String,
}

/// Response DTO wrapping a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeloDocumentoResponse {
    pub tipo: TipoPeca,
    pub conteudo: String,
    pub updated_at: DateTime<Utc>,
}

/// Envelope returned by the template endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeloEnvelope {
    pub template: Option<ModeloDocumentoResponse>,
}
