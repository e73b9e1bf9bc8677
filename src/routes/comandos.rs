//! Quick-command route
//!
//! Runs a flat-keyed prompt command against an intake and streams the
//! model's answer back as server-sent events. Order within the request:
//! auth, template lookup, tenant-scoped intake load, prompt render, model
//! call, detached usage log. The template miss happens before anything
//! costs a model invocation.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc, time::Duration, time::Instant};
use uuid::Uuid;

use crate::api::sse::StreamFrame;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::prompts::{self, DadosPrompt};
use crate::routes::atendimentos::{carregar_atendimento, carregar_documentos_apoio};
use crate::services::completion::StreamChunk;
use crate::services::uso::{self, RegistroUso};

#[derive(Debug, Deserialize)]
pub struct ExecutarComandoRequest {
    pub atendimento_id: Uuid,
    pub comando_id: String,
}

/// POST /comandos
///
/// Stream frames: `{"type":"text",...}`* then `{"type":"done",...}` with
/// token counts, or `{"type":"error",...}` once headers are committed.
pub async fn executar_comando(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<ExecutarComandoRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let template = prompts::comando(&req.comando_id)?;

    let atendimento =
        carregar_atendimento(&state.db, auth.escritorio_id, req.atendimento_id).await?;
    let documentos =
        carregar_documentos_apoio(&state.db, auth.escritorio_id, req.atendimento_id).await?;

    let dados = DadosPrompt {
        transcricao: &atendimento.transcricao,
        pedido_especifico: atendimento.pedido_especifico.as_deref(),
        analise_previa: atendimento.analise_previa.as_deref(),
        documentos: &documentos,
        ..Default::default()
    };
    let prompt = template.render(&dados);

    let inicio = Instant::now();
    let chunks = state
        .completion
        .stream_completion(&template.instrucao_sistema, &prompt)
        .await?;

    let db = state.db.clone();
    let llm = state.settings.llm.clone();
    let modelo = state.completion.modelo().to_string();
    let escritorio_id = auth.escritorio_id;
    let usuario_id = auth.user_id;

    let stream = chunks.map(move |chunk| {
        let frame = match chunk {
            StreamChunk::Texto(texto) => StreamFrame::text(texto),
            StreamChunk::Fim(usage) => {
                uso::registrar(
                    &db,
                    &llm,
                    RegistroUso {
                        escritorio_id,
                        usuario_id,
                        endpoint: "comandos",
                        modelo: modelo.clone(),
                        usage,
                        latencia_ms: inicio.elapsed().as_millis() as i64,
                    },
                );
                StreamFrame::done(usage.tokens_entrada, usage.tokens_saida)
            }
            StreamChunk::Falha(mensagem) => {
                tracing::error!(error = %mensagem, "Streaming completion failed mid-response");
                StreamFrame::error("Falha ao gerar a resposta. Tente novamente.")
            }
        };
        Ok::<Event, Infallible>(frame.evento())
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
