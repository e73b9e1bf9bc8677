//! Piece-generation templates, keyed by (practice area, piece type)
//!
//! Not every pair is registered; a missing pair is a `TemplateNotFound`
//! caught before any model call. Generation output is free Markdown
//! streamed to the caller and persisted as the piece's first version.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{
    secao_analise, secao_documentos, secao_modelo, secao_pedido, secao_transcricao, DadosPrompt,
    FormatoSaida, PromptTemplate,
};
use crate::domain::atendimentos::AreaJuridica;
use crate::domain::pecas::TipoPeca;

const PERSONA_REDATOR: &str = "Você é um advogado brasileiro experiente redigindo uma peça \
processual em nome do escritório. Escreva em português do Brasil, em norma culta forense. \
Produza a peça completa em Markdown, com os títulos das seções em maiúsculas, fundamentação \
com os dispositivos legais pertinentes e pedidos ao final quando a espécie de peça os exigir. \
Nunca invente fatos, números de processo, nomes ou datas ausentes do atendimento: use \
marcadores como [PREENCHER] para o que faltar.";

fn especialidade(area: AreaJuridica) -> &'static str {
    match area {
        AreaJuridica::Trabalhista => {
            "Especialidade: direito do trabalho. Fundamente na CLT, na jurisprudência do TST \
             e nas súmulas aplicáveis."
        }
        AreaJuridica::Civel => {
            "Especialidade: direito civil e processo civil. Fundamente no Código Civil e no \
             CPC/2015."
        }
        AreaJuridica::Previdenciario => {
            "Especialidade: direito previdenciário. Fundamente na Lei 8.213/91, no Decreto \
             3.048/99 e na jurisprudência do STJ e da TNU."
        }
        AreaJuridica::Familia => {
            "Especialidade: direito de família. Fundamente no Código Civil, no CPC/2015 e no \
             ECA quando houver interesse de menores; observe o segredo de justiça."
        }
        AreaJuridica::Consumidor => {
            "Especialidade: direito do consumidor. Fundamente no CDC e na jurisprudência do \
             STJ sobre relações de consumo."
        }
        AreaJuridica::Penal => {
            "Especialidade: direito penal e processo penal. Fundamente no Código Penal, no \
             CPP e na jurisprudência dos tribunais superiores."
        }
    }
}

fn missao(tipo: TipoPeca) -> &'static str {
    match tipo {
        TipoPeca::PeticaoInicial => {
            "Redija a petição inicial completa: endereçamento, qualificação das partes (com \
             [PREENCHER] onde faltar dado), dos fatos, do direito, dos pedidos, do valor da \
             causa e do requerimento de provas."
        }
        TipoPeca::Contestacao => {
            "Redija a contestação completa: endereçamento, preliminares cabíveis, impugnação \
             específica dos fatos da inicial, teses de mérito e pedidos."
        }
        TipoPeca::Recurso => {
            "Redija o recurso cabível: endereçamento, juízo de admissibilidade com \
             tempestividade e preparo, razões recursais enfrentando cada fundamento da \
             decisão recorrida e pedido de reforma."
        }
        TipoPeca::Parecer => {
            "Redija um parecer jurídico: ementa, relatório dos fatos, análise fundamentada \
             das questões postas e conclusão objetiva com a orientação recomendada."
        }
    }
}

fn render_geracao(dados: &DadosPrompt) -> String {
    let mut prompt = String::new();
    prompt.push_str(&secao_transcricao(dados));
    prompt.push_str(&secao_pedido(dados));
    prompt.push_str(&secao_analise(dados));
    prompt.push_str(&secao_documentos("DOCUMENTOS DE APOIO", dados.documentos));
    prompt.push_str(&secao_modelo(dados));
    prompt.push_str(
        "\nRedija a peça agora, usando os fatos do atendimento e os documentos acima. \
         Quando houver modelo do escritório, siga sua estrutura e estilo.",
    );
    prompt
}

fn template(area: AreaJuridica, tipo: TipoPeca) -> PromptTemplate {
    PromptTemplate {
        instrucao_sistema: format!(
            "{PERSONA_REDATOR}\n\n{}\n{}",
            especialidade(area),
            missao(tipo)
        ),
        formato: FormatoSaida::TextoLivre,
        render: render_geracao,
    }
}

/// Registry of generation templates. Petições iniciais and pareceres exist
/// for every area; contestações and recursos only where the practice
/// actually drafts them today.
pub static REGISTRO: Lazy<HashMap<(AreaJuridica, TipoPeca), PromptTemplate>> = Lazy::new(|| {
    use AreaJuridica::*;
    use TipoPeca::*;

    let mut registro = HashMap::new();

    for area in [Trabalhista, Civel, Previdenciario, Familia, Consumidor, Penal] {
        registro.insert((area, PeticaoInicial), template(area, PeticaoInicial));
        registro.insert((area, Parecer), template(area, Parecer));
    }
    for area in [Trabalhista, Civel, Familia, Consumidor] {
        registro.insert((area, Contestacao), template(area, Contestacao));
    }
    for area in [Trabalhista, Civel, Previdenciario, Penal] {
        registro.insert((area, Recurso), template(area, Recurso));
    }

    registro
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peticao_inicial_existe_para_todas_as_areas() {
        use AreaJuridica::*;
        for area in [Trabalhista, Civel, Previdenciario, Familia, Consumidor, Penal] {
            assert!(REGISTRO.contains_key(&(area, TipoPeca::PeticaoInicial)));
            assert!(REGISTRO.contains_key(&(area, TipoPeca::Parecer)));
        }
    }

    #[test]
    fn instrucao_carrega_persona_e_especialidade() {
        let t = &REGISTRO[&(AreaJuridica::Trabalhista, TipoPeca::PeticaoInicial)];
        assert!(t.instrucao_sistema.contains("CLT"));
        assert!(t.instrucao_sistema.contains("Markdown"));
        assert!(t.instrucao_sistema.contains("petição inicial"));
    }
}
