//! Quick-command templates
//!
//! Flat-keyed streaming commands an attorney runs against an intake. All of
//! them produce free Markdown and stream over SSE.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{
    secao_analise, secao_documentos, secao_pedido, secao_transcricao, DadosPrompt, FormatoSaida,
    PromptTemplate,
};

const PERSONA: &str = "Você é um assistente jurídico brasileiro experiente, auxiliando \
advogados de um escritório. Responda sempre em português do Brasil, com terminologia \
jurídica correta. Formate toda a resposta em Markdown, com títulos e listas quando \
couber. Não invente fatos que não estejam no atendimento; quando uma informação \
necessária estiver ausente, aponte a lacuna explicitamente.";

fn instrucao(tarefa: &str) -> String {
    format!("{PERSONA}\n\nTarefa: {tarefa}")
}

fn contexto_atendimento(dados: &DadosPrompt) -> String {
    let mut prompt = String::new();
    prompt.push_str(&secao_transcricao(dados));
    prompt.push_str(&secao_pedido(dados));
    prompt.push_str(&secao_analise(dados));
    prompt.push_str(&secao_documentos("DOCUMENTOS DE APOIO", dados.documentos));
    prompt
}

fn render_listar_documentos(dados: &DadosPrompt) -> String {
    format!(
        "{}\nCom base no atendimento acima, liste os documentos que o cliente precisa \
         providenciar para fundamentar o caso. Para cada documento, indique em uma lista \
         numerada: o nome do documento, por que ele é necessário e onde o cliente \
         normalmente o obtém. Marque os imprescindíveis com **(essencial)**.",
        contexto_atendimento(dados)
    )
}

fn render_resumo(dados: &DadosPrompt) -> String {
    format!(
        "{}\nProduza um resumo executivo do atendimento em até cinco parágrafos: quem é \
         o cliente, o que aconteceu, o que o cliente pretende, quais provas já existem e \
         quais prazos merecem atenção imediata.",
        contexto_atendimento(dados)
    )
}

fn render_analise_preliminar(dados: &DadosPrompt) -> String {
    format!(
        "{}\nFaça uma análise jurídica preliminar do caso: enquadramento legal provável, \
         teses aplicáveis com os dispositivos legais correspondentes, riscos e pontos \
         frágeis, e uma avaliação franca da viabilidade da demanda.",
        contexto_atendimento(dados)
    )
}

fn render_estrategia(dados: &DadosPrompt) -> String {
    format!(
        "{}\nProponha a estratégia jurídica para o caso: via processual recomendada, \
         pedidos principais e subsidiários, provas a produzir e ordem sugerida de \
         atuação. Quando houver mais de um caminho viável, compare-os brevemente e \
         recomende um.",
        contexto_atendimento(dados)
    )
}

fn render_proximos_passos(dados: &DadosPrompt) -> String {
    format!(
        "{}\nListe os próximos passos concretos do escritório para este caso, em ordem \
         de prioridade, cada um com o responsável sugerido (advogado, estagiário ou \
         cliente) e um prazo razoável.",
        contexto_atendimento(dados)
    )
}

/// Registry of quick commands, keyed by the public command identifier.
pub static REGISTRO: Lazy<HashMap<&'static str, PromptTemplate>> = Lazy::new(|| {
    let mut registro = HashMap::new();
    registro.insert(
        "listar_documentos",
        PromptTemplate {
            instrucao_sistema: instrucao(
                "listar os documentos necessários para instruir o caso.",
            ),
            formato: FormatoSaida::TextoLivre,
            render: render_listar_documentos,
        },
    );
    registro.insert(
        "resumo_atendimento",
        PromptTemplate {
            instrucao_sistema: instrucao("resumir o atendimento para o dossiê do caso."),
            formato: FormatoSaida::TextoLivre,
            render: render_resumo,
        },
    );
    registro.insert(
        "analise_preliminar",
        PromptTemplate {
            instrucao_sistema: instrucao("analisar preliminarmente a viabilidade jurídica."),
            formato: FormatoSaida::TextoLivre,
            render: render_analise_preliminar,
        },
    );
    registro.insert(
        "estrategia_juridica",
        PromptTemplate {
            instrucao_sistema: instrucao("propor a estratégia jurídica do caso."),
            formato: FormatoSaida::TextoLivre,
            render: render_estrategia,
        },
    );
    registro.insert(
        "proximos_passos",
        PromptTemplate {
            instrucao_sistema: instrucao("planejar os próximos passos do escritório."),
            formato: FormatoSaida::TextoLivre,
            render: render_proximos_passos,
        },
    );
    registro
});
