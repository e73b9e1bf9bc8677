//! Document versioning store
//!
//! Every content mutation on a peça snapshots the previous version into the
//! append-only `peca_versoes` log before bumping the version counter. Log
//! append and counter bump run in one transaction, so they cannot diverge.
//!
//! Concurrent edits to the same piece are deliberately not coordinated: no
//! row lock, no optimistic-concurrency token. Last writer wins, and the log
//! keeps the content each writer read as "current". Product has accepted
//! this; do not harden without a decision.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// Persist `novo_conteudo` as the next version of a piece.
///
/// Returns the new version number. Cross-tenant ids fail with `NotFound`,
/// indistinguishable from an absent piece.
pub async fn salvar_nova_versao(
    db: &PgPool,
    escritorio_id: Uuid,
    peca_id: Uuid,
    novo_conteudo: &str,
    editor_id: Uuid,
) -> Result<i32, ApiError> {
    let mut tx = db.begin().await?;

    let atual: Option<(i32, String)> = sqlx::query_as(
        "SELECT versao, conteudo_markdown FROM pecas WHERE id = $1 AND escritorio_id = $2",
    )
    .bind(peca_id)
    .bind(escritorio_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (versao_atual, conteudo_atual) =
        atual.ok_or_else(|| ApiError::not_found("Peça não encontrada"))?;

    // A freshly created piece with empty content has nothing worth
    // snapshotting; the log holds exactly versions 1..(current-1).
    if !conteudo_atual.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO peca_versoes (id, peca_id, versao, conteudo_markdown, editado_por)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(peca_id)
        .bind(versao_atual)
        .bind(&conteudo_atual)
        .bind(editor_id)
        .execute(&mut *tx)
        .await?;
    }

    let nova_versao = versao_atual + 1;

    // An edit on a reviewed piece informally drops it back to draft.
    sqlx::query(
        r#"
        UPDATE pecas SET
            conteudo_markdown = $3,
            versao = $4,
            status = CASE WHEN status = 'revisada' THEN 'rascunho' ELSE status END,
            updated_at = NOW()
        WHERE id = $1 AND escritorio_id = $2
        "#,
    )
    .bind(peca_id)
    .bind(escritorio_id)
    .bind(novo_conteudo)
    .bind(nova_versao)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(peca_id = %peca_id, versao = nova_versao, "Nova versão persistida");

    Ok(nova_versao)
}
