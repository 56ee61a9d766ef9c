use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::AuthError;
use crate::response::ErrorResponse;

pub const ORGANIZATION_NOT_FOUND: &str = "Organization not found";

/// Errors surfaced to API callers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, detail: String },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn organization_not_found() -> Self {
        ApiError::NotFound(ORGANIZATION_NOT_FOUND.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(e) => ApiError::Internal(anyhow::Error::new(e)),
            err @ AuthError::InvalidLifetime(_) => ApiError::Internal(anyhow::Error::new(err)),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation { message, detail } => {
                ErrorResponse::new(status, message.as_str()).with_detail(detail.as_str())
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                ErrorResponse::new(status, self.to_string())
            }
            _ => ErrorResponse::new(status, self.to_string()),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
