//! Central error type for the gateway
//!
//! Converts the core error taxonomy into HTTP responses with the stable
//! body shape `{"status": "error", "error": <message>}`. Internal
//! detail never leaves the process beyond a human-readable summary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use types::errors::{EmbedderError, LedgerError, PayError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "status": "error",
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<EmbedderError> for AppError {
    fn from(err: EmbedderError) -> Self {
        match err {
            EmbedderError::FaceNotFound | EmbedderError::MultipleFaces => {
                AppError::BadRequest(err.to_string())
            }
            EmbedderError::Timeout | EmbedderError::Unavailable(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // A dimension disagreement is a deployment defect, not user input
            StoreError::Dimension { .. } => AppError::Internal(anyhow::anyhow!(err)),
            StoreError::Storage(_) | StoreError::Timeout => {
                AppError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

impl From<PayError> for AppError {
    fn from(err: PayError) -> Self {
        match err {
            PayError::InvalidInput(msg) => AppError::BadRequest(msg),
            PayError::FaceNotRecognized => {
                AppError::Unauthorized(PayError::FaceNotRecognized.to_string())
            }
            PayError::Embedder(e) => e.into(),
            PayError::Store(e) => e.into(),
            PayError::Match(e) => AppError::Internal(anyhow::anyhow!(e)),
            PayError::Ledger(e) => match e {
                LedgerError::Declined { ref detail } => {
                    AppError::BadRequest(format!("Payment failed: {detail}"))
                }
                LedgerError::Timeout | LedgerError::Unavailable(_) => {
                    AppError::ServiceUnavailable(e.to_string())
                }
            },
        }
    }
}
