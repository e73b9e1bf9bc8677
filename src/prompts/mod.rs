//! Prompt template registry
//!
//! A process-wide static mapping from template key to a fixed system
//! instruction plus a pure render function. Adding a document type or a
//! quick command means adding a map entry, never a new control-flow branch.
//!
//! Renderers never drop a section: when a payload part is absent the fixed
//! heading is still emitted with an explicit placeholder sentence, so model
//! output stays structurally consistent across cases.
//!
//! The output-format contract (free Markdown vs. a single JSON object) is
//! stated by the instruction text here; the completion gateway is agnostic.

pub mod comandos;
pub mod pecas;
pub mod tarefas;

use thiserror::Error;

use crate::domain::atendimentos::AreaJuridica;
use crate::domain::pecas::TipoPeca;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum PromptError {
    /// Raised before any external call is attempted, so an unknown key
    /// never costs a model invocation.
    #[error("template não registrado: {0}")]
    TemplateNotFound(String),
}

impl From<PromptError> for ApiError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::TemplateNotFound(chave) => {
                ApiError::bad_request(format!("Template não registrado: {chave}"))
            }
        }
    }
}

/// Output contract a template imposes on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatoSaida {
    /// Free formatted Markdown, delivered token-by-token over SSE.
    TextoLivre,
    /// A single JSON object matching the schema enumerated in the
    /// instruction, fetched with the non-streaming completion call.
    JsonEstruturado,
}

/// A supporting document as it enters a prompt.
#[derive(Debug, Clone)]
pub struct DocumentoApoio {
    pub nome: String,
    pub classificacao: Option<String>,
    pub texto: String,
}

/// Everything a render function may embed. Callers fill what they have;
/// renderers emit placeholders for the rest.
#[derive(Debug, Clone, Default)]
pub struct DadosPrompt<'a> {
    pub transcricao: &'a str,
    pub pedido_especifico: Option<&'a str>,
    pub analise_previa: Option<&'a str>,
    pub documentos: &'a [DocumentoApoio],
    /// Tenant house-style template for the piece type, when registered.
    pub modelo_escritorio: Option<&'a str>,
    /// Current piece content, for refinement and validation tasks.
    pub conteudo_atual: Option<&'a str>,
    /// Free-form extra instructions from the caller.
    pub instrucoes: Option<&'a str>,
}

/// One registered template: persona/format instruction plus renderer.
#[derive(Debug)]
pub struct PromptTemplate {
    pub instrucao_sistema: String,
    pub formato: FormatoSaida,
    pub render: fn(&DadosPrompt) -> String,
}

impl PromptTemplate {
    pub fn render(&self, dados: &DadosPrompt) -> String {
        (self.render)(dados)
    }
}

/// Look up a quick command by its flat identifier.
pub fn comando(id: &str) -> Result<&'static PromptTemplate, PromptError> {
    comandos::REGISTRO
        .get(id)
        .ok_or_else(|| PromptError::TemplateNotFound(format!("comando:{id}")))
}

/// Look up the generation template for a practice area and piece type.
pub fn geracao(
    area: AreaJuridica,
    tipo: TipoPeca,
) -> Result<&'static PromptTemplate, PromptError> {
    pecas::REGISTRO.get(&(area, tipo)).ok_or_else(|| {
        PromptError::TemplateNotFound(format!("peca:{}:{}", area.as_str(), tipo.as_str()))
    })
}

/// Look up a structured (JSON-returning) task template.
pub fn tarefa(id: &str) -> Result<&'static PromptTemplate, PromptError> {
    tarefas::REGISTRO
        .get(id)
        .ok_or_else(|| PromptError::TemplateNotFound(format!("tarefa:{id}")))
}

// ---------------------------------------------------------------------------
// Shared section renderers
// ---------------------------------------------------------------------------

pub(crate) const SEM_TRANSCRICAO: &str = "Transcrição não disponível.";
pub(crate) const SEM_PEDIDO: &str = "Nenhum pedido específico registrado.";
pub(crate) const SEM_ANALISE: &str = "Nenhuma análise prévia.";
pub(crate) const SEM_DOCUMENTOS: &str = "Nenhum documento anexado.";
pub(crate) const SEM_MODELO: &str = "Nenhum modelo do escritório cadastrado.";
pub(crate) const SEM_TEXTO_EXTRAIDO: &str = "(texto não extraído)";

pub(crate) fn secao(titulo: &str, conteudo: Option<&str>, placeholder: &str) -> String {
    let corpo = match conteudo {
        Some(texto) if !texto.trim().is_empty() => texto.trim(),
        _ => placeholder,
    };
    format!("## {titulo}\n{corpo}\n")
}

pub(crate) fn secao_transcricao(dados: &DadosPrompt) -> String {
    secao(
        "TRANSCRIÇÃO DO ATENDIMENTO",
        Some(dados.transcricao),
        SEM_TRANSCRICAO,
    )
}

pub(crate) fn secao_pedido(dados: &DadosPrompt) -> String {
    secao("PEDIDO ESPECÍFICO", dados.pedido_especifico, SEM_PEDIDO)
}

pub(crate) fn secao_analise(dados: &DadosPrompt) -> String {
    secao("ANÁLISE PRÉVIA", dados.analise_previa, SEM_ANALISE)
}

pub(crate) fn secao_modelo(dados: &DadosPrompt) -> String {
    secao(
        "MODELO DO ESCRITÓRIO",
        dados.modelo_escritorio,
        SEM_MODELO,
    )
}

pub(crate) fn secao_documentos(titulo: &str, documentos: &[DocumentoApoio]) -> String {
    let mut saida = format!("## {titulo}\n");
    if documentos.is_empty() {
        saida.push_str(SEM_DOCUMENTOS);
        saida.push('\n');
        return saida;
    }
    for doc in documentos {
        match &doc.classificacao {
            Some(tag) => saida.push_str(&format!("### {} ({})\n", doc.nome, tag)),
            None => saida.push_str(&format!("### {}\n", doc.nome)),
        }
        if doc.texto.trim().is_empty() {
            saida.push_str(SEM_TEXTO_EXTRAIDO);
        } else {
            saida.push_str(doc.texto.trim());
        }
        saida.push('\n');
    }
    saida
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dados_vazios<'a>() -> DadosPrompt<'a> {
        DadosPrompt {
            transcricao: "Cliente foi demitido sem justa causa após 3 anos",
            ..Default::default()
        }
    }

    #[test]
    fn comando_desconhecido_falha_antes_de_qualquer_chamada() {
        let err = comando("comando_inexistente").unwrap_err();
        assert!(matches!(err, PromptError::TemplateNotFound(_)));
    }

    #[test]
    fn geracao_sem_par_registrado_falha() {
        // penal + contestacao is intentionally not registered
        assert!(geracao(AreaJuridica::Penal, TipoPeca::Contestacao).is_err());
        assert!(geracao(AreaJuridica::Trabalhista, TipoPeca::PeticaoInicial).is_ok());
    }

    #[test]
    fn secoes_nunca_sao_omitidas_sem_documentos() {
        let template = comando("listar_documentos").expect("registered");
        let prompt = template.render(&dados_vazios());
        assert!(prompt.contains("## DOCUMENTOS DE APOIO"));
        assert!(prompt.contains(SEM_DOCUMENTOS));
        assert!(prompt.contains("## PEDIDO ESPECÍFICO"));
        assert!(prompt.contains(SEM_PEDIDO));
    }

    #[test]
    fn documentos_presentes_sao_listados_com_classificacao() {
        let docs = vec![DocumentoApoio {
            nome: "CTPS.pdf".to_string(),
            classificacao: Some("documento_trabalhista".to_string()),
            texto: "Registro de admissão em 02/01/2021".to_string(),
        }];
        let dados = DadosPrompt {
            transcricao: "x",
            documentos: &docs,
            ..Default::default()
        };
        let saida = secao_documentos("DOCUMENTOS DE APOIO", dados.documentos);
        assert!(saida.contains("### CTPS.pdf (documento_trabalhista)"));
        assert!(saida.contains("Registro de admissão"));
        assert!(!saida.contains(SEM_DOCUMENTOS));
    }

    #[test]
    fn comandos_sao_texto_livre_e_tarefas_sao_json() {
        for id in comandos::REGISTRO.keys() {
            let t = comando(id).unwrap();
            assert_eq!(t.formato, FormatoSaida::TextoLivre, "{id}");
            assert!(
                t.instrucao_sistema.contains("Markdown"),
                "streaming instruction must state the text contract: {id}"
            );
        }
        for id in tarefas::REGISTRO.keys() {
            let t = tarefa(id).unwrap();
            assert_eq!(t.formato, FormatoSaida::JsonEstruturado, "{id}");
            assert!(
                t.instrucao_sistema.contains("JSON"),
                "structured instruction must state the JSON contract: {id}"
            );
        }
    }

    #[test]
    fn geracao_embute_modelo_do_escritorio_quando_presente() {
        let template = geracao(AreaJuridica::Trabalhista, TipoPeca::PeticaoInicial).unwrap();
        let dados = DadosPrompt {
            transcricao: "x",
            modelo_escritorio: Some("Papel timbrado padrão do escritório."),
            ..Default::default()
        };
        let prompt = template.render(&dados);
        assert!(prompt.contains("## MODELO DO ESCRITÓRIO"));
        assert!(prompt.contains("Papel timbrado padrão"));

        let sem_modelo = template.render(&dados_vazios());
        assert!(sem_modelo.contains(SEM_MODELO));
    }
}
