//! Client for the external document-export renderer.
//!
//! The renderer turns the piece's Markdown into a downloadable DOCX; it is
//! an external collaborator and stays one.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::error;

use crate::error::ApiError;

#[derive(Clone)]
pub struct ExportadorClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ExportadorClient {
    pub fn new(base_url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Export renderer client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Render a piece to DOCX bytes.
    pub async fn render_docx(&self, titulo: &str, markdown: &str) -> Result<Vec<u8>, ApiError> {
        #[derive(Serialize)]
        struct Request<'a> {
            titulo: &'a str,
            markdown: &'a str,
            formato: &'static str,
        }

        let url = format!("{}/v1/render", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-Internal-Token", &self.token)
            .json(&Request {
                titulo,
                markdown,
                formato: "docx",
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Export renderer request failed");
                ApiError::upstream(format!("Export renderer unavailable: {e}"))
            })?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| {
                ApiError::upstream(format!("Failed to read rendered document: {e}"))
            })?;
            Ok(bytes.to_vec())
        } else if status == StatusCode::BAD_REQUEST {
            Err(ApiError::bad_request("Conteúdo não pôde ser renderizado"))
        } else {
            error!(status = %status, "Export renderer error");
            Err(ApiError::upstream(format!(
                "Export renderer returned {status}"
            )))
        }
    }

    /// Check renderer health.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        self.client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Export renderer health check failed")?
            .error_for_status()
            .context("Export renderer unhealthy")?;

        Ok(())
    }
}
