//! Structured task templates
//!
//! Tasks whose answer is a single JSON object matching an enumerated
//! schema, fetched with the non-streaming completion call: refinement,
//! validation and fact extraction.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{
    secao, secao_documentos, secao_transcricao, DadosPrompt, FormatoSaida, PromptTemplate,
    SEM_PEDIDO,
};

const PERSONA_REVISOR: &str = "Você é um advogado brasileiro revisor, trabalhando para um \
escritório. Responda em português do Brasil. Sua resposta deve ser exatamente um único \
objeto JSON válido, sem texto antes ou depois; se usar cerca de código, rotule-a como json.";

fn render_refinar(dados: &DadosPrompt) -> String {
    let mut prompt = String::new();
    prompt.push_str(&secao(
        "PEÇA ATUAL",
        dados.conteudo_atual,
        "Peça sem conteúdo.",
    ));
    prompt.push_str(&secao_documentos("NOVOS DOCUMENTOS", dados.documentos));
    prompt.push_str(&secao(
        "INSTRUÇÕES ADICIONAIS",
        dados.instrucoes,
        SEM_PEDIDO,
    ));
    prompt.push_str(
        "\nIncorpore à peça as informações dos novos documentos. Devolva um objeto JSON \
         com as chaves: \"conteudo_markdown\" (a peça completa revisada), \"mudancas\" \
         (lista de frases descrevendo cada alteração feita) e \"divergencias\" (lista de \
         contradições encontradas entre os documentos e o texto original; lista vazia se \
         não houver).",
    );
    prompt
}

fn render_validar(dados: &DadosPrompt) -> String {
    let mut prompt = String::new();
    prompt.push_str(&secao(
        "PEÇA ATUAL",
        dados.conteudo_atual,
        "Peça sem conteúdo.",
    ));
    prompt.push_str(&secao_transcricao(dados));
    prompt.push_str(&secao_documentos("DOCUMENTOS DE APOIO", dados.documentos));
    prompt.push_str(
        "\nAvalie a peça acima. Devolva um objeto JSON com as chaves: \"coerencia\", \
         \"legislacao\", \"jurisprudencia\" e \"doutrina\" (notas de 0 a 10, números), e \
         \"observacoes\" (lista de frases com os problemas encontrados e as correções \
         sugeridas). Notas baixas exigem observações correspondentes.",
    );
    prompt
}

fn render_extrair_fatos(dados: &DadosPrompt) -> String {
    let mut prompt = String::new();
    prompt.push_str(&secao_transcricao(dados));
    prompt.push_str(&secao_documentos("DOCUMENTOS DE APOIO", dados.documentos));
    prompt.push_str(
        "\nExtraia os fatos estruturados do atendimento. Devolva um objeto JSON com as \
         chaves: \"partes\" (lista de {nome, papel}), \"datas\" (lista de {data, evento}, \
         datas em ISO 8601 quando determináveis), \"valores\" (lista de {descricao, \
         valor}) e \"pedidos\" (lista de frases). Liste apenas o que estiver presente no \
         material; listas vazias são aceitáveis.",
    );
    prompt
}

/// Registry of structured tasks, keyed by task identifier.
pub static REGISTRO: Lazy<HashMap<&'static str, PromptTemplate>> = Lazy::new(|| {
    let mut registro = HashMap::new();
    registro.insert(
        "refinar_peca",
        PromptTemplate {
            instrucao_sistema: format!(
                "{PERSONA_REVISOR}\nTarefa: refinar uma peça com base em novos documentos."
            ),
            formato: FormatoSaida::JsonEstruturado,
            render: render_refinar,
        },
    );
    registro.insert(
        "validar_peca",
        PromptTemplate {
            instrucao_sistema: format!(
                "{PERSONA_REVISOR}\nTarefa: validar a qualidade técnica de uma peça."
            ),
            formato: FormatoSaida::JsonEstruturado,
            render: render_validar,
        },
    );
    registro.insert(
        "extrair_fatos",
        PromptTemplate {
            instrucao_sistema: format!(
                "{PERSONA_REVISOR}\nTarefa: extrair fatos estruturados de um atendimento."
            ),
            formato: FormatoSaida::JsonEstruturado,
            render: render_extrair_fatos,
        },
    );
    registro
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinar_preserva_secoes_sem_documentos() {
        let t = &REGISTRO["refinar_peca"];
        let dados = DadosPrompt {
            transcricao: "",
            conteudo_atual: Some("# Petição"),
            ..Default::default()
        };
        let prompt = t.render(&dados);
        assert!(prompt.contains("## PEÇA ATUAL"));
        assert!(prompt.contains("## NOVOS DOCUMENTOS"));
        assert!(prompt.contains(super::super::SEM_DOCUMENTOS));
        assert!(prompt.contains("## INSTRUÇÕES ADICIONAIS"));
    }

    #[test]
    fn validar_enumera_o_esquema_de_notas() {
        let t = &REGISTRO["validar_peca"];
        let prompt = t.render(&DadosPrompt {
            transcricao: "x",
            conteudo_atual: Some("# Peça"),
            ..Default::default()
        });
        for chave in ["coerencia", "legislacao", "jurisprudencia", "doutrina"] {
            assert!(prompt.contains(chave), "schema must name {chave}");
        }
    }
}
