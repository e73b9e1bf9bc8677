//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints.

#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Also covers cross-tenant lookups: a row owned by another escritório
    /// is indistinguishable from a row that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Schema validation failure with per-field detail.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        campos: Vec<CampoInvalido>,
    },

    /// The external completion/render provider failed or was unreachable.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// The model answered, but not with the JSON shape the template asked
    /// for. Retryable by the caller; never coerced into a default.
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    /// AI credentials absent on an instance that received an AI request.
    #[error("LLM credentials are not configured")]
    MissingCredentials,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// One invalid field in a `Validation` error.
#[derive(Debug, Clone, Serialize)]
pub struct CampoInvalido {
    pub campo: String,
    pub motivo: String,
}

impl CampoInvalido {
    pub fn new(campo: impl Into<String>, motivo: impl Into<String>) -> Self {
        Self {
            campo: campo.into(),
            motivo: motivo.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<CampoInvalido>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>, campos: Vec<CampoInvalido>) -> Self {
        Self::Validation {
            message: msg.into(),
            campos,
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream(_)
            | Self::MalformedModelOutput(_)
            | Self::MissingCredentials
            | Self::Internal(_)
            | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::MalformedModelOutput(_) => "MALFORMED_MODEL_OUTPUT",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::Validation { message, .. } => message.clone(),
            Self::Upstream(_) => "Falha no serviço externo. Tente novamente.".to_string(),
            Self::MalformedModelOutput(_) => {
                "O modelo retornou uma resposta inválida. Tente novamente.".to_string()
            }
            Self::MissingCredentials => {
                "Recursos de IA não estão configurados nesta instância.".to_string()
            }
            // Don't leak internal error details
            Self::Internal(_) | Self::Database(_) => "An internal error occurred".to_string(),
        }
    }

    fn details(&self) -> Option<Vec<CampoInvalido>> {
        match self {
            Self::Validation { campos, .. } => Some(campos.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Database(e) => {
                tracing::error!(error = ?e, "Database error");
            }
            Self::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream provider error");
            }
            Self::MalformedModelOutput(msg) => {
                tracing::warn!(error = %msg, "Model output did not match expected shape");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
            details: self.details(),
            request_id: None, // Will be populated by middleware if available
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::validation("x", vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MissingCredentials.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::MalformedModelOutput("no json".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::upstream("timeout").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_never_leak_details() {
        let err = ApiError::Internal(anyhow::anyhow!("secret connection string"));
        assert_eq!(err.public_message(), "An internal error occurred");
        let err = ApiError::Upstream("provider said: key sk-abc".into());
        assert!(!err.public_message().contains("sk-abc"));
    }

    #[test]
    fn validation_carries_field_details() {
        let err = ApiError::validation(
            "Payload inválido",
            vec![CampoInvalido::new("motivo", "não pode ser vazio")],
        );
        let campos = err.details().expect("validation has details");
        assert_eq!(campos.len(), 1);
        assert_eq!(campos[0].campo, "motivo");
    }
}
