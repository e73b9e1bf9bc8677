//! Completion gateway for the external text-generation provider.
//!
//! Two calls: a streaming completion that yields text chunks as they arrive
//! plus a terminal usage summary, and a non-streaming completion that
//! extracts a single JSON object from the model's answer.
//!
//! The HTTP client and credentials initialize once, on first use, behind a
//! `OnceCell`: an instance deployed without `LLM_API_KEY` boots normally and
//! only AI routes fail, with `MissingCredentials`.

use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::LlmSettings;
use crate::error::ApiError;

/// Token counts reported by the provider for one completion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub tokens_entrada: u32,
    pub tokens_saida: u32,
}

/// One element of a streaming completion. The sequence is finite and
/// non-restartable: after `Fim` or `Falha` nothing else is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Texto(String),
    Fim(TokenUsage),
    /// Upstream failed after the stream opened. Surfaced in-band so a
    /// partially forwarded response can still be closed cleanly.
    Falha(String),
}

struct GatewayInner {
    client: reqwest::Client,
    api_key: String,
}

/// Client for the external completion API (OpenAI-compatible wire shape).
#[derive(Clone)]
pub struct CompletionGateway {
    settings: LlmSettings,
    inner: Arc<OnceCell<GatewayInner>>,
}

impl CompletionGateway {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            settings,
            inner: Arc::new(OnceCell::new()),
        }
    }

    /// Model identifier used for usage records.
    pub fn modelo(&self) -> &str {
        &self.settings.modelo
    }

    /// Initialize-once guarded accessor for the HTTP client. Racing
    /// initializers would compute the same value, so the race is benign.
    fn inner(&self) -> Result<&GatewayInner, ApiError> {
        self.inner.get_or_try_init(|| {
            let api_key = self
                .settings
                .api_key
                .clone()
                .ok_or(ApiError::MissingCredentials)?;

            let client = reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| {
                    ApiError::Internal(anyhow::anyhow!("Failed to create HTTP client: {e}"))
                })?;

            tracing::info!(modelo = %self.settings.modelo, "Completion gateway initialized");

            Ok(GatewayInner { client, api_key })
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Open a streaming completion. Returns the lazy chunk sequence; the
    /// terminal `Fim` carries token usage once the provider reports it.
    ///
    /// Errors before the stream opens (bad credentials, refused request)
    /// surface as `Err`; errors after it opens arrive as a `Falha` chunk.
    pub async fn stream_completion(
        &self,
        sistema: &str,
        prompt: &str,
    ) -> Result<BoxStream<'static, StreamChunk>, ApiError> {
        let inner = self.inner()?;

        let body = ChatRequest {
            model: &self.settings.modelo,
            messages: [
                ChatMessage {
                    role: "system",
                    content: sistema,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.settings.max_output_tokens,
            stream: true,
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        };

        let response = inner
            .client
            .post(self.endpoint())
            .bearer_auth(&inner.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::upstream(format!("Completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detalhe = response.text().await.unwrap_or_default();
            return Err(ApiError::upstream(format!(
                "Completion provider returned {status}: {detalhe}"
            )));
        }

        Ok(sse_chunks(response.bytes_stream().boxed()).boxed())
    }

    /// Non-streaming completion whose answer must contain a single JSON
    /// object. Transient upstream failures (connect errors, 429, 5xx) are
    /// retried with exponential backoff; a well-formed answer without
    /// extractable JSON is `MalformedModelOutput`, left for the caller to
    /// retry deliberately.
    pub async fn completion_json(
        &self,
        sistema: &str,
        prompt: &str,
    ) -> Result<(serde_json::Value, TokenUsage), ApiError> {
        let inner = self.inner()?;

        let body = ChatRequest {
            model: &self.settings.modelo,
            messages: [
                ChatMessage {
                    role: "system",
                    content: sistema,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.settings.max_output_tokens,
            stream: false,
            stream_options: None,
        };

        let politica = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(Duration::from_secs(15)))
            .build();

        let timeout = Duration::from_secs(self.settings.timeout_seconds);
        let endpoint = self.endpoint();

        let resposta: ChatResponse = backoff::future::retry(politica, || async {
            let response = inner
                .client
                .post(endpoint.as_str())
                .bearer_auth(&inner.api_key)
                .timeout(timeout)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(ApiError::upstream(format!(
                        "Completion request failed: {e}"
                    )))
                })?;

            let status = response.status();
            if status.is_success() {
                response.json::<ChatResponse>().await.map_err(|e| {
                    backoff::Error::permanent(ApiError::upstream(format!(
                        "Invalid completion response: {e}"
                    )))
                })
            } else {
                let detalhe = response.text().await.unwrap_or_default();
                let err = ApiError::upstream(format!(
                    "Completion provider returned {status}: {detalhe}"
                ));
                if status.as_u16() == 429 || status.is_server_error() {
                    Err(backoff::Error::transient(err))
                } else {
                    Err(backoff::Error::permanent(err))
                }
            }
        })
        .await?;

        let usage = resposta
            .usage
            .map(|u| TokenUsage {
                tokens_entrada: u.prompt_tokens,
                tokens_saida: u.completion_tokens,
            })
            .unwrap_or_default();

        // Concatenate every returned text segment before extraction.
        let texto: String = resposta
            .choices
            .iter()
            .filter_map(|c| c.message.content.as_deref())
            .collect();

        let bruto = extrair_json(&texto).ok_or_else(|| {
            ApiError::MalformedModelOutput("resposta sem objeto JSON".to_string())
        })?;

        let valor: serde_json::Value = serde_json::from_str(bruto)
            .map_err(|e| ApiError::MalformedModelOutput(format!("JSON inválido: {e}")))?;

        Ok((valor, usage))
    }
}

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<UsageWire>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct UsageWire {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct StreamEventWire {
    #[serde(default)]
    choices: Vec<StreamChoiceWire>,
    #[serde(default)]
    usage: Option<UsageWire>,
}

#[derive(Deserialize)]
struct StreamChoiceWire {
    delta: StreamDeltaWire,
}

#[derive(Deserialize)]
struct StreamDeltaWire {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// SSE chunk parsing
// ---------------------------------------------------------------------------

struct SseState<S> {
    bytes: S,
    /// Raw byte buffer; lines only convert to UTF-8 once complete, so a
    /// multi-byte character split across network chunks survives.
    buffer: Vec<u8>,
    pending: VecDeque<StreamChunk>,
    usage: TokenUsage,
    terminado: bool,
}

/// Turn the provider's SSE byte stream into a finite `StreamChunk` sequence.
/// Generic over the error type so the parser is testable without reqwest.
fn sse_chunks<S, B, E>(bytes: S) -> impl Stream<Item = StreamChunk>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = SseState {
        bytes,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        usage: TokenUsage::default(),
        terminado: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(chunk) = st.pending.pop_front() {
                if matches!(chunk, StreamChunk::Fim(_) | StreamChunk::Falha(_)) {
                    st.terminado = true;
                    st.pending.clear();
                }
                return Some((chunk, st));
            }

            if st.terminado {
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(parte)) => {
                    st.buffer.extend_from_slice(parte.as_ref());
                    drain_lines(&mut st);
                }
                Some(Err(e)) => {
                    st.pending
                        .push_back(StreamChunk::Falha(format!("erro no stream: {e}")));
                }
                None => {
                    // EOF without a [DONE] marker is an abnormal close.
                    st.pending.push_back(StreamChunk::Falha(
                        "conexão encerrada antes do fim da resposta".to_string(),
                    ));
                }
            }
        }
    })
}

fn drain_lines<S>(st: &mut SseState<S>) {
    while let Some(pos) = st.buffer.iter().position(|&b| b == b'\n') {
        let linha_bytes: Vec<u8> = st.buffer.drain(..=pos).collect();
        let linha = String::from_utf8_lossy(&linha_bytes);
        let linha = linha.trim_end_matches(['\n', '\r']);

        let Some(payload) = linha.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            continue;
        }

        if payload == "[DONE]" {
            st.pending.push_back(StreamChunk::Fim(st.usage));
            return;
        }

        match serde_json::from_str::<StreamEventWire>(payload) {
            Ok(evento) => {
                if let Some(u) = evento.usage {
                    st.usage = TokenUsage {
                        tokens_entrada: u.prompt_tokens,
                        tokens_saida: u.completion_tokens,
                    };
                }
                for escolha in evento.choices {
                    if let Some(texto) = escolha.delta.content {
                        if !texto.is_empty() {
                            st.pending.push_back(StreamChunk::Texto(texto));
                        }
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable stream event");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Extract the JSON payload from a model answer.
///
/// Strategy 1: a fenced code block labeled `json`. Strategy 2: the first
/// balanced `{…}` span, string/escape aware. The second is best-effort and
/// can mis-pick when the answer holds several JSON-like spans; that is the
/// documented precision limit of this fallback.
pub fn extrair_json(texto: &str) -> Option<&str> {
    if let Some(fenced) = extrair_bloco_cercado(texto) {
        return Some(fenced);
    }
    extrair_chaves_balanceadas(texto)
}

fn extrair_bloco_cercado(texto: &str) -> Option<&str> {
    let mut resto = texto;
    let mut base = 0usize;
    while let Some(abre) = resto.find("```") {
        let apos_cerca = abre + 3;
        let corpo = &resto[apos_cerca..];
        let fim_rotulo = corpo.find('\n')?;
        let rotulo = corpo[..fim_rotulo].trim();
        let conteudo = &corpo[fim_rotulo + 1..];
        if let Some(fecha) = conteudo.find("```") {
            if rotulo.eq_ignore_ascii_case("json") {
                let inicio = base + apos_cerca + fim_rotulo + 1;
                return Some(texto[inicio..inicio + fecha].trim());
            }
            // Skip past this fenced block and keep looking.
            let avanco = apos_cerca + fim_rotulo + 1 + fecha + 3;
            base += avanco;
            resto = &resto[avanco..];
        } else {
            return None;
        }
    }
    None
}

fn extrair_chaves_balanceadas(texto: &str) -> Option<&str> {
    let inicio = texto.find('{')?;
    let mut profundidade = 0usize;
    let mut em_string = false;
    let mut escapado = false;

    for (i, c) in texto[inicio..].char_indices() {
        if em_string {
            if escapado {
                escapado = false;
            } else if c == '\\' {
                escapado = true;
            } else if c == '"' {
                em_string = false;
            }
            continue;
        }
        match c {
            '"' => em_string = true,
            '{' => profundidade += 1,
            '}' => {
                profundidade -= 1;
                if profundidade == 0 {
                    return Some(&texto[inicio..inicio + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn parse(texto: &str) -> Option<serde_json::Value> {
        extrair_json(texto).and_then(|s| serde_json::from_str(s).ok())
    }

    #[test]
    fn extrai_bloco_cercado_rotulado_em_meio_a_prosa() {
        let texto = "Claro! Segue o resultado:\n```json\n{\"a\": 1}\n```\nEspero ter ajudado.";
        assert_eq!(parse(texto), Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn extrai_objeto_cru_sem_cerca() {
        assert_eq!(parse("{\"a\":1}"), Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn texto_sem_json_retorna_none() {
        assert_eq!(extrair_json("Não foi possível analisar o caso."), None);
    }

    #[test]
    fn cerca_sem_rotulo_json_cai_no_fallback_balanceado() {
        let texto = "```text\nnada\n```\nresultado: {\"b\": 2} fim";
        assert_eq!(parse(texto), Some(serde_json::json!({"b": 2})));
    }

    #[test]
    fn chaves_dentro_de_strings_nao_quebram_o_balanceamento() {
        let texto = "prefixo {\"a\": \"tem } e { aqui\", \"b\": {\"c\": 3}} sufixo";
        assert_eq!(
            parse(texto),
            Some(serde_json::json!({"a": "tem } e { aqui", "b": {"c": 3}}))
        );
    }

    #[test]
    fn primeiro_span_balanceado_vence_quando_ha_varios() {
        // Documented precision limit: the first balanced span is taken.
        let texto = "{\"primeiro\": true} e depois {\"segundo\": true}";
        assert_eq!(parse(texto), Some(serde_json::json!({"primeiro": true})));
    }

    #[test]
    fn aspas_escapadas_dentro_de_strings() {
        let texto = "{\"a\": \"diz \\\"oi\\\" e {\"}";
        assert_eq!(parse(texto), Some(serde_json::json!({"a": "diz \"oi\" e {"})));
    }

    // -- SSE parsing --------------------------------------------------------

    fn eventos(partes: Vec<&[u8]>) -> Vec<StreamChunk> {
        let fonte = stream::iter(
            partes
                .into_iter()
                .map(|p| Ok::<_, Infallible>(p.to_vec()))
                .collect::<Vec<_>>(),
        );
        futures::executor::block_on(sse_chunks(fonte).collect::<Vec<_>>())
    }

    fn delta(texto: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}}}}]}}\n\n",
            serde_json::to_string(texto).unwrap()
        )
    }

    #[test]
    fn stream_simples_produz_textos_e_fim_com_usage() {
        let corpo = format!(
            "{}{}data: {{\"choices\":[],\"usage\":{{\"prompt_tokens\":12,\"completion_tokens\":34}}}}\n\ndata: [DONE]\n\n",
            delta("Olá"),
            delta(" doutor")
        );
        let saida = eventos(vec![corpo.as_bytes()]);
        assert_eq!(
            saida,
            vec![
                StreamChunk::Texto("Olá".to_string()),
                StreamChunk::Texto(" doutor".to_string()),
                StreamChunk::Fim(TokenUsage {
                    tokens_entrada: 12,
                    tokens_saida: 34
                }),
            ]
        );
    }

    #[test]
    fn linha_dividida_entre_chunks_de_rede_e_remontada() {
        let corpo = delta("petição");
        let bytes = corpo.as_bytes();
        // Split in the middle of the multi-byte "ç" to prove byte-buffering.
        let meio = corpo.find('ç').unwrap() + 1;
        let saida = eventos(vec![&bytes[..meio], &bytes[meio..], b"data: [DONE]\n\n" as &[u8]]);
        assert_eq!(saida[0], StreamChunk::Texto("petição".to_string()));
        assert!(matches!(saida[1], StreamChunk::Fim(_)));
    }

    #[test]
    fn fim_abrupto_sem_done_vira_falha() {
        let corpo = delta("parcial");
        let saida = eventos(vec![corpo.as_bytes()]);
        assert_eq!(saida.len(), 2);
        assert_eq!(saida[0], StreamChunk::Texto("parcial".to_string()));
        assert!(matches!(saida[1], StreamChunk::Falha(_)));
    }

    #[test]
    fn nada_apos_o_terminal() {
        let saida = eventos(vec![b"data: [DONE]\n\n" as &[u8], b"data: lixo\n\n" as &[u8]]);
        assert_eq!(saida.len(), 1);
        assert!(matches!(saida[0], StreamChunk::Fim(_)));
    }
}
