pub mod atendimentos;
pub mod comandos;
pub mod health;
pub mod me;
pub mod modelos;
pub mod pecas;
pub mod uso;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Session
        .route("/me", get(me::get_me))
        // Atendimentos (intakes)
        .route("/atendimentos", post(atendimentos::create_atendimento))
        .route("/atendimentos", get(atendimentos::list_atendimentos))
        .route("/atendimentos/:atendimento_id", get(atendimentos::get_atendimento))
        .route(
            "/atendimentos/:atendimento_id/transcricao",
            put(atendimentos::update_transcricao),
        )
        // Quick commands (streaming)
        .route("/comandos", post(comandos::executar_comando))
        // Pieces (generated documents)
        .route(
            "/atendimentos/:atendimento_id/pecas",
            post(pecas::gerar_peca),
        )
        .route(
            "/atendimentos/:atendimento_id/pecas",
            get(pecas::list_pecas),
        )
        .route("/pecas/:peca_id", get(pecas::get_peca))
        .route("/pecas/:peca_id/versoes", get(pecas::list_versoes))
        .route("/pecas/:peca_id/conteudo", post(pecas::salvar_conteudo))
        .route("/pecas/:peca_id/refinar", post(pecas::refinar_peca))
        .route("/pecas/:peca_id/validar", post(pecas::validar_peca))
        .route("/pecas/:peca_id/enviar-revisao", post(pecas::enviar_revisao))
        .route("/pecas/:peca_id/aprovar", post(pecas::aprovar_peca))
        .route("/pecas/:peca_id/rejeitar", post(pecas::rejeitar_peca))
        .route("/pecas/:peca_id/exportar", post(pecas::exportar_peca))
        // Tenant document templates
        .route("/modelos/:tipo", get(modelos::get_modelo))
        .route("/modelos/:tipo", post(modelos::upsert_modelo))
        // Usage log (admin)
        .route("/uso", get(uso::list_uso))
}
