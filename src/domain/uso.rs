//! Usage log domain types
//!
//! Immutable per-call records of the completion gateway, kept for
//! observability and billing. Written fire-and-forget; read back only by
//! office admins.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RegistroUsoResponse {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub endpoint: String,
    pub modelo: String,
    pub tokens_entrada: i32,
    pub tokens_saida: i32,
    pub custo_estimado: Decimal,
    pub latencia_ms: i64,
    pub created_at: DateTime<Utc>,
}
