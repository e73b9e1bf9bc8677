//! Streaming frame format for the AI endpoints.
//!
//! Frames travel as `data: <json>\n\n` server-sent events. The terminal
//! frame is either `done` (token counts, plus the persisted piece for
//! generation) or `error` — errors after the headers commit must arrive
//! in-band, not as an HTTP status.

use axum::response::sse::Event;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamFrame {
    Text {
        content: String,
    },
    Done {
        tokens_entrada: u32,
        tokens_saida: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        peca_id: Option<Uuid>,
        #[serde(skip_serializing_if = "Option::is_none")]
        versao: Option<i32>,
    },
    Error {
        message: String,
    },
}

impl StreamFrame {
    pub fn text(content: String) -> Self {
        Self::Text { content }
    }

    pub fn done(tokens_entrada: u32, tokens_saida: u32) -> Self {
        Self::Done {
            tokens_entrada,
            tokens_saida,
            peca_id: None,
            versao: None,
        }
    }

    pub fn done_com_peca(tokens_entrada: u32, tokens_saida: u32, peca_id: Uuid, versao: i32) -> Self {
        Self::Done {
            tokens_entrada,
            tokens_saida,
            peca_id: Some(peca_id),
            versao: Some(versao),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Render as an SSE event (`data: <json>`).
    pub fn evento(&self) -> Event {
        Event::default().data(serde_json::to_string(self).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_seguem_o_contrato_de_tipo() {
        let texto = serde_json::to_value(StreamFrame::text("Olá".into())).unwrap();
        assert_eq!(texto["type"], "text");
        assert_eq!(texto["content"], "Olá");

        let fim = serde_json::to_value(StreamFrame::done(10, 20)).unwrap();
        assert_eq!(fim["type"], "done");
        assert_eq!(fim["tokens_entrada"], 10);
        assert!(fim.get("peca_id").is_none());

        let erro = serde_json::to_value(StreamFrame::error("falhou")).unwrap();
        assert_eq!(erro["type"], "error");
        assert_eq!(erro["message"], "falhou");
    }

    #[test]
    fn done_de_geracao_carrega_a_peca_persistida() {
        let id = Uuid::new_v4();
        let fim = serde_json::to_value(StreamFrame::done_com_peca(1, 2, id, 1)).unwrap();
        assert_eq!(fim["peca_id"], id.to_string());
        assert_eq!(fim["versao"], 1);
    }
}
