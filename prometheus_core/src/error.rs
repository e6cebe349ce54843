//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai::AiError;
use crate::storage::StorageError;
use crate::validation::ValidationReport;

pub type Result<T> = std::result::Result<T, AppError>;

pub const AI_UNAVAILABLE_MESSAGE: &str =
    "Assistant IA indisponible: configurez OPENAI_API_KEY sur le backend.";
pub const AI_TEMPORARY_ERROR_MESSAGE: &str = "Erreur IA temporaire.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream returned an empty answer")]
    UpstreamEmpty,

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::JsonError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamEmpty => StatusCode::BAD_GATEWAY,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::Storage(_) | AppError::IoError(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut errors = None;
        let message = match self {
            AppError::Validation(report) => {
                let message = report.message();
                errors = Some(report.to_json());
                message
            }
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::TooManyRequests(msg) => msg,
            AppError::UpstreamUnavailable(msg) => {
                tracing::warn!("AI provider unavailable: {}", msg);
                AI_UNAVAILABLE_MESSAGE.to_string()
            }
            AppError::UpstreamEmpty => {
                tracing::warn!("AI provider returned an empty answer");
                AI_TEMPORARY_ERROR_MESSAGE.to_string()
            }
            AppError::Upstream { status: code, message } => {
                if status.is_server_error() {
                    tracing::error!(status = code, "AI provider error: {}", message);
                    AI_TEMPORARY_ERROR_MESSAGE.to_string()
                } else {
                    message
                }
            }
            AppError::Storage(err) => {
                tracing::error!("Storage error: {}", err);
                "Erreur interne du serveur.".to_string()
            }
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                "Erreur interne du serveur.".to_string()
            }
            AppError::JsonError(err) => {
                tracing::debug!("JSON error: {:?}", err);
                "Requete JSON invalide.".to_string()
            }
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                "Erreur interne du serveur.".to_string()
            }
        };

        let mut body = json!({
            "success": false,
            "status": status.as_u16(),
            "message": message,
        });
        if let Some(errors) = errors {
            body["errors"] = errors;
        }

        (status, Json(body)).into_response()
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Unavailable => {
                AppError::UpstreamUnavailable("OPENAI_API_KEY n'est pas configuree.".to_string())
            }
            AiError::InvalidRequest(msg) => AppError::BadRequest(msg),
            AiError::EmptyAnswer => AppError::UpstreamEmpty,
            AiError::Provider { status, message } => AppError::Upstream { status, message },
            AiError::Transport(message) | AiError::Decode(message) => AppError::Upstream {
                status: 500,
                message,
            },
        }
    }
}
