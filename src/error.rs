use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::models::quote::ErrorResponse;

/// Message returned for every rejected submission; field-level detail stays in the logs.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input values";

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("could not parse {field}: {reason}")]
    Parse { field: &'static str, reason: String },
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("quote store lock poisoned")]
    LockPoisoned,
}

impl QuoteError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Parse { .. })
    }
}

/// HTTP-facing error. Validation failures become 400 with a generic body,
/// malformed query strings and path segments 400 with the extractor's text,
/// anything else a 500 carrying the error text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Quote not found")]
    NotFound,
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Quote(e) if e.is_validation() => {
                warn!("Rejected quote submission: {}", e);
                (StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE.to_string())
            }
            Self::Quote(e) => {
                error!("Quote request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::BadRequest(text) => {
                warn!("Rejected request: {}", text);
                (StatusCode::BAD_REQUEST, text.clone())
            }
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
