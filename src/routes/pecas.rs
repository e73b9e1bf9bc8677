//! Piece (peça) routes
//!
//! Generation, manual edits, AI refinement and validation, the review
//! state machine and export. Content mutations go through the versioning
//! store; review transitions are conditional updates keyed on the current
//! status so a double approval loses the race with a 404 instead of
//! silently succeeding twice.

use axum::{
    extract::{Path, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::{DateTime, Utc};
use futures::stream::{Stream, StreamExt};
use parking_lot::Mutex;
use sqlx::PgPool;
use std::{convert::Infallible, sync::Arc, time::Duration, time::Instant};
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::api::sse::StreamFrame;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::atendimentos::AreaJuridica;
use crate::domain::pecas::{
    GerarPecaRequest, PecaResponse, RefinarPecaRequest, RefinarPecaResponse, RefinoModelo,
    RejeitarPecaRequest, RevisaoResponse, SalvarConteudoRequest, SalvarConteudoResponse,
    StatusPeca, TipoPeca, ValidacaoPeca, VersaoPecaResponse,
};
use crate::error::{ApiError, CampoInvalido};
use crate::prompts::{self, DadosPrompt, DocumentoApoio};
use crate::routes::atendimentos::{carregar_atendimento, carregar_documentos_apoio};
use crate::services::completion::StreamChunk;
use crate::services::uso::{self, RegistroUso};
use crate::services::versoes;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const PECA_COLUNAS: &str = "id, atendimento_id, titulo, area, tipo_peca, conteudo_markdown, \
     versao, status, resultado_validacao, motivo_rejeicao, revisado_por, revisado_em, \
     created_at, updated_at";

/// Database row for peça
#[derive(Debug, sqlx::FromRow)]
struct PecaRow {
    id: Uuid,
    atendimento_id: Uuid,
    titulo: String,
    area: String,
    tipo_peca: String,
    conteudo_markdown: String,
    versao: i32,
    status: String,
    resultado_validacao: Option<serde_json::Value>,
    motivo_rejeicao: Option<String>,
    revisado_por: Option<Uuid>,
    revisado_em: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PecaRow> for PecaResponse {
    fn from(row: PecaRow) -> Self {
        Self {
            id: row.id,
            atendimento_id: row.atendimento_id,
            titulo: row.titulo,
            area: AreaJuridica::parse(&row.area).unwrap_or(AreaJuridica::Civel),
            tipo_peca: TipoPeca::parse(&row.tipo_peca).unwrap_or(TipoPeca::Parecer),
            conteudo_markdown: row.conteudo_markdown,
            versao: row.versao,
            status: StatusPeca::parse(&row.status).unwrap_or(StatusPeca::Rascunho),
            resultado_validacao: row.resultado_validacao,
            motivo_rejeicao: row.motivo_rejeicao,
            revisado_por: row.revisado_por,
            revisado_em: row.revisado_em,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Load a piece scoped to the caller's tenant.
async fn carregar_peca(
    db: &PgPool,
    escritorio_id: Uuid,
    peca_id: Uuid,
) -> Result<PecaRow, ApiError> {
    sqlx::query_as::<_, PecaRow>(&format!(
        "SELECT {PECA_COLUNAS} FROM pecas WHERE id = $1 AND escritorio_id = $2"
    ))
    .bind(peca_id)
    .bind(escritorio_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::not_found("Peça não encontrada"))
}

/// Load prompt-ready documents by id, re-checking tenant ownership of every
/// single one. A missing or foreign id fails the whole request.
async fn carregar_documentos_por_id(
    db: &PgPool,
    escritorio_id: Uuid,
    documento_ids: &[Uuid],
) -> Result<Vec<DocumentoApoio>, ApiError> {
    let linhas: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
        r#"
        SELECT nome_original, classificacao, texto_extraido
        FROM documentos
        WHERE id = ANY($1) AND escritorio_id = $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(documento_ids)
    .bind(escritorio_id)
    .fetch_all(db)
    .await?;

    if linhas.len() != documento_ids.len() {
        return Err(ApiError::not_found("Documento não encontrado"));
    }

    Ok(linhas
        .into_iter()
        .map(|(nome, classificacao, texto)| DocumentoApoio {
            nome,
            classificacao,
            texto: texto.unwrap_or_default(),
        })
        .collect())
}

async fn inserir_peca(
    db: &PgPool,
    escritorio_id: Uuid,
    atendimento_id: Uuid,
    titulo: &str,
    area: AreaJuridica,
    tipo: TipoPeca,
    conteudo: &str,
    criado_por: Uuid,
) -> Result<Uuid, ApiError> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO pecas
            (id, escritorio_id, atendimento_id, titulo, area, tipo_peca,
             conteudo_markdown, versao, status, criado_por, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 1, 'rascunho', $8, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(escritorio_id)
    .bind(atendimento_id)
    .bind(titulo)
    .bind(area.as_str())
    .bind(tipo.as_str())
    .bind(conteudo)
    .bind(criado_por)
    .fetch_one(db)
    .await?;

    Ok(id)
}

// ============================================================================
// Generation (streaming)
// ============================================================================

/// POST /atendimentos/:atendimento_id/pecas
///
/// Generate a piece from the intake. Text streams to the caller while the
/// full content accumulates server-side; on the provider's final chunk the
/// piece is persisted as version 1 and the `done` frame carries its id.
pub async fn gerar_peca(
    State(state): State<Arc<AppState>>,
    Path(atendimento_id): Path<Uuid>,
    auth: RequireAuth,
    Json(req): Json<GerarPecaRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let atendimento = carregar_atendimento(&state.db, auth.escritorio_id, atendimento_id).await?;
    let area = atendimento.area();

    // Template lookup precedes everything that costs money.
    let template = prompts::geracao(area, req.tipo_peca)?;

    let documentos =
        carregar_documentos_apoio(&state.db, auth.escritorio_id, atendimento_id).await?;

    let modelo_escritorio: Option<String> = sqlx::query_scalar(
        "SELECT conteudo FROM modelos_documento WHERE escritorio_id = $1 AND tipo = $2",
    )
    .bind(auth.escritorio_id)
    .bind(req.tipo_peca.as_str())
    .fetch_optional(&state.db)
    .await?;

    let dados = DadosPrompt {
        transcricao: &atendimento.transcricao,
        pedido_especifico: atendimento.pedido_especifico.as_deref(),
        analise_previa: atendimento.analise_previa.as_deref(),
        documentos: &documentos,
        modelo_escritorio: modelo_escritorio.as_deref(),
        ..Default::default()
    };
    let prompt = template.render(&dados);

    let inicio = Instant::now();
    let chunks = state
        .completion
        .stream_completion(&template.instrucao_sistema, &prompt)
        .await?;

    let titulo = req
        .titulo
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| req.tipo_peca.titulo_padrao().to_string());

    let acumulado = Arc::new(Mutex::new(String::new()));
    let db = state.db.clone();
    let llm = state.settings.llm.clone();
    let modelo = state.completion.modelo().to_string();
    let tipo = req.tipo_peca;
    let escritorio_id = auth.escritorio_id;
    let usuario_id = auth.user_id;

    let stream = chunks.then(move |chunk| {
        let db = db.clone();
        let llm = llm.clone();
        let modelo = modelo.clone();
        let titulo = titulo.clone();
        let acumulado = acumulado.clone();

        async move {
            let frame = match chunk {
                StreamChunk::Texto(texto) => {
                    acumulado.lock().push_str(&texto);
                    StreamFrame::text(texto)
                }
                StreamChunk::Fim(usage) => {
                    uso::registrar(
                        &db,
                        &llm,
                        RegistroUso {
                            escritorio_id,
                            usuario_id,
                            endpoint: "pecas/gerar",
                            modelo,
                            usage,
                            latencia_ms: inicio.elapsed().as_millis() as i64,
                        },
                    );

                    let conteudo = acumulado.lock().clone();
                    match inserir_peca(
                        &db,
                        escritorio_id,
                        atendimento_id,
                        &titulo,
                        area,
                        tipo,
                        &conteudo,
                        usuario_id,
                    )
                    .await
                    {
                        Ok(peca_id) => StreamFrame::done_com_peca(
                            usage.tokens_entrada,
                            usage.tokens_saida,
                            peca_id,
                            1,
                        ),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to persist generated piece");
                            StreamFrame::error(
                                "A peça foi gerada mas não pôde ser salva. Tente novamente.",
                            )
                        }
                    }
                }
                StreamChunk::Falha(mensagem) => {
                    tracing::error!(error = %mensagem, "Generation stream failed mid-response");
                    StreamFrame::error("Falha ao gerar a peça. Tente novamente.")
                }
            };
            Ok::<Event, Infallible>(frame.evento())
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

// ============================================================================
// Reads
// ============================================================================

/// GET /atendimentos/:atendimento_id/pecas
pub async fn list_pecas(
    State(state): State<Arc<AppState>>,
    Path(atendimento_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    // 404s for a foreign intake before listing anything.
    carregar_atendimento(&state.db, auth.escritorio_id, atendimento_id).await?;

    let linhas = sqlx::query_as::<_, PecaRow>(&format!(
        r#"
        SELECT {PECA_COLUNAS} FROM pecas
        WHERE atendimento_id = $1 AND escritorio_id = $2
        ORDER BY created_at DESC
        "#
    ))
    .bind(atendimento_id)
    .bind(auth.escritorio_id)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<PecaResponse> = linhas.into_iter().map(Into::into).collect();
    Ok(Json(DataResponse::new(data)))
}

/// GET /pecas/:peca_id
pub async fn get_peca(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let peca = carregar_peca(&state.db, auth.escritorio_id, peca_id).await?;
    Ok(Json(DataResponse::new(PecaResponse::from(peca))))
}

/// GET /pecas/:peca_id/versoes
///
/// Version log in ascending order; the current content is not in the log
/// until something supersedes it.
pub async fn list_versoes(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    carregar_peca(&state.db, auth.escritorio_id, peca_id).await?;

    let linhas: Vec<(i32, String, Option<Uuid>, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT versao, conteudo_markdown, editado_por, created_at
        FROM peca_versoes
        WHERE peca_id = $1
        ORDER BY versao ASC
        "#,
    )
    .bind(peca_id)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<VersaoPecaResponse> = linhas
        .into_iter()
        .map(|(versao, conteudo_markdown, editado_por, created_at)| VersaoPecaResponse {
            versao,
            conteudo_markdown,
            editado_por,
            created_at,
        })
        .collect();

    Ok(Json(DataResponse::new(data)))
}

// ============================================================================
// Content mutations
// ============================================================================

/// POST /pecas/:peca_id/conteudo
///
/// Manual edit. The versioning store snapshots the previous content first.
pub async fn salvar_conteudo(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
    Json(req): Json<SalvarConteudoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.conteudo_markdown.trim().is_empty() {
        return Err(ApiError::validation(
            "Payload inválido",
            vec![CampoInvalido::new("conteudo_markdown", "não pode ser vazio")],
        ));
    }

    let versao = versoes::salvar_nova_versao(
        &state.db,
        auth.escritorio_id,
        peca_id,
        &req.conteudo_markdown,
        auth.user_id,
    )
    .await?;

    Ok(Json(SalvarConteudoResponse { ok: true, versao }))
}

/// POST /pecas/:peca_id/refinar
///
/// Refine the piece against newly attached documents. The model returns
/// `{conteudo_markdown, mudancas, divergencias}`; the new content is
/// persisted through the versioning store.
pub async fn refinar_peca(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
    Json(req): Json<RefinarPecaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.documento_ids.is_empty() {
        return Err(ApiError::validation(
            "Payload inválido",
            vec![CampoInvalido::new(
                "documento_ids",
                "informe ao menos um documento",
            )],
        ));
    }

    let template = prompts::tarefa("refinar_peca")?;
    let peca = carregar_peca(&state.db, auth.escritorio_id, peca_id).await?;
    let documentos =
        carregar_documentos_por_id(&state.db, auth.escritorio_id, &req.documento_ids).await?;

    let dados = DadosPrompt {
        conteudo_atual: Some(&peca.conteudo_markdown),
        documentos: &documentos,
        instrucoes: req.instrucoes.as_deref(),
        ..Default::default()
    };
    let prompt = template.render(&dados);

    let inicio = Instant::now();
    let (valor, usage) = state
        .completion
        .completion_json(&template.instrucao_sistema, &prompt)
        .await?;

    let refino: RefinoModelo = serde_json::from_value(valor)
        .map_err(|e| ApiError::MalformedModelOutput(format!("refino fora do esquema: {e}")))?;

    let versao = versoes::salvar_nova_versao(
        &state.db,
        auth.escritorio_id,
        peca_id,
        &refino.conteudo_markdown,
        auth.user_id,
    )
    .await?;

    uso::registrar(
        &state.db,
        &state.settings.llm,
        RegistroUso {
            escritorio_id: auth.escritorio_id,
            usuario_id: auth.user_id,
            endpoint: "pecas/refinar",
            modelo: state.completion.modelo().to_string(),
            usage,
            latencia_ms: inicio.elapsed().as_millis() as i64,
        },
    );

    Ok(Json(RefinarPecaResponse {
        versao,
        mudancas: refino.mudancas,
        divergencias: refino.divergencias,
    }))
}

/// POST /pecas/:peca_id/validar
///
/// Technical validation of the piece. Scores are stored on the piece and
/// returned; content and version are untouched.
pub async fn validar_peca(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let template = prompts::tarefa("validar_peca")?;
    let peca = carregar_peca(&state.db, auth.escritorio_id, peca_id).await?;
    let atendimento =
        carregar_atendimento(&state.db, auth.escritorio_id, peca.atendimento_id).await?;
    let documentos =
        carregar_documentos_apoio(&state.db, auth.escritorio_id, peca.atendimento_id).await?;

    let dados = DadosPrompt {
        transcricao: &atendimento.transcricao,
        conteudo_atual: Some(&peca.conteudo_markdown),
        documentos: &documentos,
        ..Default::default()
    };
    let prompt = template.render(&dados);

    let inicio = Instant::now();
    let (valor, usage) = state
        .completion
        .completion_json(&template.instrucao_sistema, &prompt)
        .await?;

    let validacao: ValidacaoPeca = serde_json::from_value(valor.clone())
        .map_err(|e| ApiError::MalformedModelOutput(format!("validação fora do esquema: {e}")))?;

    sqlx::query(
        "UPDATE pecas SET resultado_validacao = $3, updated_at = NOW() \
         WHERE id = $1 AND escritorio_id = $2",
    )
    .bind(peca_id)
    .bind(auth.escritorio_id)
    .bind(&valor)
    .execute(&state.db)
    .await?;

    uso::registrar(
        &state.db,
        &state.settings.llm,
        RegistroUso {
            escritorio_id: auth.escritorio_id,
            usuario_id: auth.user_id,
            endpoint: "pecas/validar",
            modelo: state.completion.modelo().to_string(),
            usage,
            latencia_ms: inicio.elapsed().as_millis() as i64,
        },
    );

    Ok(Json(DataResponse::new(validacao)))
}

// ============================================================================
// Review state machine
// ============================================================================

/// POST /pecas/:peca_id/enviar-revisao
///
/// rascunho → aguardando_revisao.
pub async fn enviar_revisao(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, PecaRow>(&format!(
        r#"
        UPDATE pecas SET status = 'aguardando_revisao', updated_at = NOW()
        WHERE id = $1 AND escritorio_id = $2 AND status = 'rascunho'
        RETURNING {PECA_COLUNAS}
        "#
    ))
    .bind(peca_id)
    .bind(auth.escritorio_id)
    .fetch_optional(&state.db)
    .await?;

    match row {
        Some(peca) => Ok(Json(RevisaoResponse {
            ok: true,
            peca: peca.into(),
        })),
        None => {
            // Distinguish wrong-state from missing for the caller's UX;
            // cross-tenant still reads as missing.
            carregar_peca(&state.db, auth.escritorio_id, peca_id).await?;
            Err(ApiError::bad_request(
                "Apenas peças em rascunho podem ser enviadas para revisão",
            ))
        }
    }
}

/// POST /pecas/:peca_id/aprovar
///
/// aguardando_revisao → revisada. Conditional on the current status, so a
/// concurrent double-approval resolves to one success and one 404.
pub async fn aprovar_peca(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.papel.pode_revisar() {
        return Err(ApiError::forbidden(
            "Apenas administradores e advogados podem revisar peças",
        ));
    }

    let row = sqlx::query_as::<_, PecaRow>(&format!(
        r#"
        UPDATE pecas SET
            status = 'revisada',
            revisado_por = $3,
            revisado_em = NOW(),
            motivo_rejeicao = NULL,
            updated_at = NOW()
        WHERE id = $1 AND escritorio_id = $2 AND status = 'aguardando_revisao'
        RETURNING {PECA_COLUNAS}
        "#
    ))
    .bind(peca_id)
    .bind(auth.escritorio_id)
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Peça não encontrada ou não está aguardando revisão"))?;

    Ok(Json(RevisaoResponse {
        ok: true,
        peca: row.into(),
    }))
}

/// POST /pecas/:peca_id/rejeitar
///
/// aguardando_revisao → rejeitada, with a mandatory reason.
pub async fn rejeitar_peca(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
    Json(req): Json<RejeitarPecaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.papel.pode_revisar() {
        return Err(ApiError::forbidden(
            "Apenas administradores e advogados podem revisar peças",
        ));
    }

    if req.motivo.trim().is_empty() {
        return Err(ApiError::validation(
            "Payload inválido",
            vec![CampoInvalido::new("motivo", "não pode ser vazio")],
        ));
    }

    let row = sqlx::query_as::<_, PecaRow>(&format!(
        r#"
        UPDATE pecas SET
            status = 'rejeitada',
            motivo_rejeicao = $4,
            revisado_por = $3,
            revisado_em = NOW(),
            updated_at = NOW()
        WHERE id = $1 AND escritorio_id = $2 AND status = 'aguardando_revisao'
        RETURNING {PECA_COLUNAS}
        "#
    ))
    .bind(peca_id)
    .bind(auth.escritorio_id)
    .bind(auth.user_id)
    .bind(req.motivo.trim())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Peça não encontrada ou não está aguardando revisão"))?;

    Ok(Json(RevisaoResponse {
        ok: true,
        peca: row.into(),
    }))
}

// ============================================================================
// Export
// ============================================================================

/// POST /pecas/:peca_id/exportar
///
/// Render the piece to DOCX via the external renderer and return it as a
/// download with a derived filename.
pub async fn exportar_peca(
    State(state): State<Arc<AppState>>,
    Path(peca_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let peca = carregar_peca(&state.db, auth.escritorio_id, peca_id).await?;

    if peca.conteudo_markdown.trim().is_empty() {
        return Err(ApiError::bad_request("Peça sem conteúdo para exportar"));
    }

    let corpo = state
        .exportador
        .render_docx(&peca.titulo, &peca.conteudo_markdown)
        .await?;

    sqlx::query(
        "UPDATE pecas SET status = 'exportada', updated_at = NOW() \
         WHERE id = $1 AND escritorio_id = $2",
    )
    .bind(peca_id)
    .bind(auth.escritorio_id)
    .execute(&state.db)
    .await?;

    let nome = derivar_nome_arquivo(&peca.titulo, peca.versao);

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{nome}\""),
            ),
        ],
        corpo,
    ))
}

fn derivar_nome_arquivo(titulo: &str, versao: i32) -> String {
    let slug = slug(titulo);
    format!("{slug}-v{versao}.docx")
}

fn slug(texto: &str) -> String {
    let mut saida = String::new();
    for c in texto.to_lowercase().chars() {
        let c = desacentuar(c);
        if c.is_ascii_alphanumeric() {
            saida.push(c);
        } else if !saida.is_empty() && !saida.ends_with('-') {
            saida.push('-');
        }
    }
    let slug = saida.trim_matches('-');
    if slug.is_empty() {
        "peca".to_string()
    } else {
        slug.to_string()
    }
}

fn desacentuar(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' => 'a',
        'é' | 'ê' => 'e',
        'í' => 'i',
        'ó' | 'ô' | 'õ' => 'o',
        'ú' | 'ü' => 'u',
        'ç' => 'c',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nome_de_arquivo_vem_do_titulo_e_da_versao() {
        assert_eq!(
            derivar_nome_arquivo("Petição Inicial - Reclamatória", 3),
            "peticao-inicial-reclamatoria-v3.docx"
        );
        assert_eq!(derivar_nome_arquivo("Parecer Jurídico", 1), "parecer-juridico-v1.docx");
    }

    #[test]
    fn titulo_sem_caracteres_uteis_cai_no_nome_padrao() {
        assert_eq!(derivar_nome_arquivo("###", 2), "peca-v2.docx");
    }

    #[test]
    fn linha_de_status_desconhecida_nao_derruba_a_resposta() {
        let row = PecaRow {
            id: Uuid::new_v4(),
            atendimento_id: Uuid::new_v4(),
            titulo: "Contestação".to_string(),
            area: "trabalhista".to_string(),
            tipo_peca: "contestacao".to_string(),
            conteudo_markdown: "# Contestação".to_string(),
            versao: 2,
            status: "status_legado".to_string(),
            resultado_validacao: None,
            motivo_rejeicao: None,
            revisado_por: None,
            revisado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let resposta = PecaResponse::from(row);
        assert_eq!(resposta.status, StatusPeca::Rascunho);
        assert_eq!(resposta.tipo_peca, TipoPeca::Contestacao);
    }
}
