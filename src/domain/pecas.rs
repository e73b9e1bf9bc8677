//! Generated piece (peça) domain types
//!
//! A peça is the versioned legal-document artifact produced by the
//! generation pipeline. Content mutations snapshot the previous version
//! before overwriting; the review lifecycle is a small state machine:
//! rascunho → aguardando_revisao → {revisada | rejeitada}, with revisada
//! pieces dropping back to rascunho on further edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::atendimentos::AreaJuridica;

/// Lifecycle status of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPeca {
    Rascunho,
    AguardandoRevisao,
    Revisada,
    Rejeitada,
    Exportada,
}

impl StatusPeca {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rascunho" => Some(Self::Rascunho),
            "aguardando_revisao" => Some(Self::AguardandoRevisao),
            "revisada" => Some(Self::Revisada),
            "rejeitada" => Some(Self::Rejeitada),
            "exportada" => Some(Self::Exportada),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rascunho => "rascunho",
            Self::AguardandoRevisao => "aguardando_revisao",
            Self::Revisada => "revisada",
            Self::Rejeitada => "rejeitada",
            Self::Exportada => "exportada",
        }
    }
}

/// Kind of legal document a piece renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoPeca {
    PeticaoInicial,
    Contestacao,
    Recurso,
    Parecer,
}

impl TipoPeca {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "peticao_inicial" => Some(Self::PeticaoInicial),
            "contestacao" => Some(Self::Contestacao),
            "recurso" => Some(Self::Recurso),
            "parecer" => Some(Self::Parecer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeticaoInicial => "peticao_inicial",
            Self::Contestacao => "contestacao",
            Self::Recurso => "recurso",
            Self::Parecer => "parecer",
        }
    }

    /// Human title used when the caller does not name the piece.
    pub fn titulo_padrao(&self) -> &'static str {
        match self {
            Self::PeticaoInicial => "Petição Inicial",
            Self::Contestacao => "Contestação",
            Self::Recurso => "Recurso",
            Self::Parecer => "Parecer Jurídico",
        }
    }
}

/// Response DTO for a piece
#[derive(Debug, Clone, Serialize)]
pub struct PecaResponse {
    pub id: Uuid,
    pub atendimento_id: Uuid,
    pub titulo: String,
    pub area: AreaJuridica,
    pub tipo_peca: TipoPeca,
    pub conteudo_markdown: String,
    pub versao: i32,
    pub status: StatusPeca,
    pub resultado_validacao: Option<serde_json::Value>,
    pub motivo_rejeicao: Option<String>,
    pub revisado_por: Option<Uuid>,
    pub revisado_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for generating a piece from an intake
#[derive(Debug, Clone, Deserialize)]
pub struct GerarPecaRequest {
    pub tipo_peca: TipoPeca,
    #[serde(default)]
    pub titulo: Option<String>,
}

/// Request DTO for a manual content edit
#[derive(Debug, Clone, Deserialize)]
pub struct SalvarConteudoRequest {
    pub conteudo_markdown: String,
}

/// Response DTO after a content save
#[derive(Debug, Clone, Serialize)]
pub struct SalvarConteudoResponse {
    pub ok: bool,
    pub versao: i32,
}

/// Request DTO for AI refinement against newly attached documents
#[derive(Debug, Clone, Deserialize)]
pub struct RefinarPecaRequest {
    pub documento_ids: Vec<Uuid>,
    #[serde(default)]
    pub instrucoes: Option<String>,
}

/// The JSON object the refinement template instructs the model to return.
#[derive(Debug, Clone, Deserialize)]
pub struct RefinoModelo {
    pub conteudo_markdown: String,
    #[serde(default)]
    pub mudancas: Vec<String>,
    #[serde(default)]
    pub divergencias: Vec<String>,
}

/// Response DTO after refinement
#[derive(Debug, Clone, Serialize)]
pub struct RefinarPecaResponse {
    pub versao: i32,
    pub mudancas: Vec<String>,
    pub divergencias: Vec<String>,
}

/// The JSON object the validation template instructs the model to return.
/// Persisted verbatim into `pecas.resultado_validacao`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidacaoPeca {
    /// Internal coherence of the argument, 0-10.
    pub coerencia: f64,
    /// Fit of the cited legislation, 0-10.
    pub legislacao: f64,
    /// Fit of the cited case law, 0-10.
    pub jurisprudencia: f64,
    /// Fit of the cited doctrine, 0-10.
    pub doutrina: f64,
    #[serde(default)]
    pub observacoes: Vec<String>,
}

/// Request DTO for rejecting a piece under review
#[derive(Debug, Clone, Deserialize)]
pub struct RejeitarPecaRequest {
    pub motivo: String,
}

/// Response DTO for review transitions (approve/reject/submit)
#[derive(Debug, Clone, Serialize)]
pub struct RevisaoResponse {
    pub ok: bool,
    pub peca: PecaResponse,
}

/// One historical version of a piece
#[derive(Debug, Clone, Serialize)]
pub struct VersaoPecaResponse {
    pub versao: i32,
    pub conteudo_markdown: String,
    pub editado_por: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            StatusPeca::Rascunho,
            StatusPeca::AguardandoRevisao,
            StatusPeca::Revisada,
            StatusPeca::Rejeitada,
            StatusPeca::Exportada,
        ] {
            assert_eq!(StatusPeca::parse(status.as_str()), Some(status));
        }
        assert_eq!(StatusPeca::parse("em_analise"), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(StatusPeca::AguardandoRevisao).unwrap(),
            serde_json::json!("aguardando_revisao")
        );
    }

    #[test]
    fn refino_tolerates_missing_lists() {
        let refino: RefinoModelo = serde_json::from_value(serde_json::json!({
            "conteudo_markdown": "# Peça"
        }))
        .expect("lists default to empty");
        assert!(refino.mudancas.is_empty());
        assert!(refino.divergencias.is_empty());
    }

    #[test]
    fn validacao_round_trips_as_jsonb_value() {
        let validacao = ValidacaoPeca {
            coerencia: 8.5,
            legislacao: 9.0,
            jurisprudencia: 7.0,
            doutrina: 6.5,
            observacoes: vec!["Citar Súmula 443 do TST".to_string()],
        };
        let value = serde_json::to_value(&validacao).unwrap();
        let back: ValidacaoPeca = serde_json::from_value(value).unwrap();
        assert_eq!(back.coerencia, 8.5);
        assert_eq!(back.observacoes.len(), 1);
    }
}
