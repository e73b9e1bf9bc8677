//! Intake (atendimento) domain types
//!
//! An atendimento gathers the client conversation transcript, the specific
//! request, structured extracted facts and attached documents for one case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::documentos::DocumentoResponse;

/// Legal practice area of an intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaJuridica {
    Trabalhista,
    Civel,
    Previdenciario,
    Familia,
    Consumidor,
    Penal,
}

impl AreaJuridica {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trabalhista" => Some(Self::Trabalhista),
            "civel" => Some(Self::Civel),
            "previdenciario" => Some(Self::Previdenciario),
            "familia" => Some(Self::Familia),
            "consumidor" => Some(Self::Consumidor),
            "penal" => Some(Self::Penal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trabalhista => "trabalhista",
            Self::Civel => "civel",
            Self::Previdenciario => "previdenciario",
            Self::Familia => "familia",
            Self::Consumidor => "consumidor",
            Self::Penal => "penal",
        }
    }
}

/// How the intake was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModoInput {
    /// Recorded consultation, transcribed by the external transcription API.
    Audio,
    /// Typed directly by the attorney.
    Texto,
}

impl ModoInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Texto => "texto",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "audio" => Some(Self::Audio),
            "texto" => Some(Self::Texto),
            _ => None,
        }
    }
}

/// Request DTO for creating an intake
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAtendimentoRequest {
    pub cliente_id: Uuid,
    pub area: AreaJuridica,
    #[serde(default)]
    pub tipo_servico: Option<String>,
    pub modo_input: ModoInput,
}

/// Request DTO for replacing the transcript (manual edit or re-transcription)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTranscricaoRequest {
    pub transcricao: String,
    #[serde(default)]
    pub pedido_especifico: Option<String>,
}

/// Response DTO for an intake
#[derive(Debug, Clone, Serialize)]
pub struct AtendimentoResponse {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub area: AreaJuridica,
    pub tipo_servico: Option<String>,
    pub modo_input: ModoInput,
    pub transcricao: String,
    pub pedido_especifico: Option<String>,
    /// Stored output of a prior preliminary analysis, embedded in later
    /// generation prompts when present.
    pub analise_previa: Option<String>,
    pub fatos_extraidos: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documentos: Vec<DocumentoResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_round_trips_through_storage_strings() {
        for area in [
            AreaJuridica::Trabalhista,
            AreaJuridica::Civel,
            AreaJuridica::Previdenciario,
            AreaJuridica::Familia,
            AreaJuridica::Consumidor,
            AreaJuridica::Penal,
        ] {
            assert_eq!(AreaJuridica::parse(area.as_str()), Some(area));
        }
        assert_eq!(AreaJuridica::parse("tributario"), None);
    }

    #[test]
    fn modo_input_deserializes_snake_case() {
        let req: CreateAtendimentoRequest = serde_json::from_value(serde_json::json!({
            "cliente_id": "a6f1f7ab-24a1-4f3e-8c5b-8d9f3cf1e111",
            "area": "trabalhista",
            "modo_input": "audio"
        }))
        .expect("valid payload");
        assert_eq!(req.modo_input, ModoInput::Audio);
        assert!(req.tipo_servico.is_none());
    }
}
