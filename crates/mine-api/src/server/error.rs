use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use mine_api_core::api::ErrorResponse;

// ==============================================================================
// Error Type
// ==============================================================================

/// Handler failures. Each variant carries a short `error` summary and, when
/// there is something more specific to say, a `details` string.
#[derive(Debug)]
pub(crate) enum AppError {
    BadRequest {
        error: String,
        details: Option<String>,
    },
    Unauthorized,
    NotFound {
        error: String,
        details: Option<String>,
    },
    Internal {
        error: String,
        details: Option<String>,
    },
}

impl AppError {
    pub(crate) fn bad_request(error: impl Into<String>) -> Self {
        Self::BadRequest {
            error: error.into(),
            details: None,
        }
    }

    pub(crate) fn not_found(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::NotFound {
            error: error.into(),
            details: Some(details.into()),
        }
    }

    /// A node or server failure; `source` is surfaced as `details`.
    pub(crate) fn internal(error: impl Into<String>, source: impl Display) -> Self {
        Self::Internal {
            error: error.into(),
            details: Some(source.to_string()),
        }
    }

    pub(crate) fn with_details(self, details: impl Into<String>) -> Self {
        let details = Some(details.into());
        match self {
            Self::BadRequest { error, .. } => Self::BadRequest { error, details },
            Self::NotFound { error, .. } => Self::NotFound { error, details },
            Self::Internal { error, .. } => Self::Internal { error, details },
            Self::Unauthorized => Self::Unauthorized,
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Unauthorized => ErrorResponse {
                error: "Unauthorized".to_owned(),
                details: None,
            },
            Self::BadRequest { error, details }
            | Self::NotFound { error, details }
            | Self::Internal { error, details } => ErrorResponse { error, details },
        };

        (status, Json(body)).into_response()
    }
}
