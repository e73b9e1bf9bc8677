//! Usage recorder
//!
//! Persists token counts, latency and an estimated cost per completion
//! call. Writes are detached from the response path: a failed insert is
//! logged and never fails or delays the user-visible response.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::LlmSettings;
use crate::services::completion::TokenUsage;

/// One gateway call to record.
#[derive(Debug)]
pub struct RegistroUso {
    pub escritorio_id: Uuid,
    pub usuario_id: Uuid,
    pub endpoint: &'static str,
    pub modelo: String,
    pub usage: TokenUsage,
    pub latencia_ms: i64,
}

/// Cost estimate from the configured per-1k-token prices.
pub fn custo_estimado(llm: &LlmSettings, usage: &TokenUsage) -> Decimal {
    let mil = Decimal::from(1000);
    Decimal::from(usage.tokens_entrada) * llm.preco_entrada_por_mil / mil
        + Decimal::from(usage.tokens_saida) * llm.preco_saida_por_mil / mil
}

/// Fire-and-forget insert into the append-only usage log.
pub fn registrar(db: &PgPool, llm: &LlmSettings, registro: RegistroUso) {
    let custo = custo_estimado(llm, &registro.usage);
    let db = db.clone();

    tokio::spawn(async move {
        let resultado = sqlx::query(
            r#"
            INSERT INTO registros_uso
                (id, escritorio_id, usuario_id, endpoint, modelo,
                 tokens_entrada, tokens_saida, custo_estimado, latencia_ms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(registro.escritorio_id)
        .bind(registro.usuario_id)
        .bind(registro.endpoint)
        .bind(&registro.modelo)
        .bind(registro.usage.tokens_entrada as i32)
        .bind(registro.usage.tokens_saida as i32)
        .bind(custo)
        .bind(registro.latencia_ms)
        .execute(&db)
        .await;

        if let Err(e) = resultado {
            tracing::warn!(
                error = %e,
                endpoint = registro.endpoint,
                "Failed to record completion usage"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_de_teste() -> LlmSettings {
        LlmSettings {
            base_url: "http://localhost".to_string(),
            api_key: None,
            modelo: "gpt-4o".to_string(),
            max_output_tokens: 1024,
            timeout_seconds: 30,
            // 0.0025 per 1k input, 0.01 per 1k output
            preco_entrada_por_mil: Decimal::new(25, 4),
            preco_saida_por_mil: Decimal::new(1, 2),
        }
    }

    #[test]
    fn custo_combina_entrada_e_saida() {
        let usage = TokenUsage {
            tokens_entrada: 2000,
            tokens_saida: 500,
        };
        // 2 * 0.0025 + 0.5 * 0.01 = 0.01
        assert_eq!(custo_estimado(&llm_de_teste(), &usage), Decimal::new(1, 2));
    }

    #[test]
    fn custo_zero_para_uso_zero() {
        let usage = TokenUsage::default();
        assert_eq!(custo_estimado(&llm_de_teste(), &usage), Decimal::ZERO);
    }
}
