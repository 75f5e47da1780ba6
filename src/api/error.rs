use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::response::ErrorBody;
use crate::ai::{AiError, PlanParseError};
use crate::auth::AuthError;
use crate::extract::ExtractError;
use crate::models::ModelError;
use crate::storage::StorageError;

/// Every failure a handler can return. Rendered as the error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    Unavailable(String),
    /// A collaborator failed in a way the client may see.
    #[error("{0}")]
    Upstream(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(err) => {
                tracing::error!("Internal error: {err:#}");
                "Internal server error".to_string()
            }
            Self::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                msg
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody::new(status, message))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ModelError>() {
            Some(e @ ModelError::DuplicateDay(_)) => Self::Upstream(e.to_string()),
            Some(e @ (ModelError::EmailTaken | ModelError::PasswordRequired)) => {
                Self::BadRequest(e.to_string())
            }
            None => Self::Internal(err),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::RateLimited => Self::RateLimited("Rate limit exceeded. Please try again later.".into()),
            AiError::Unavailable => {
                Self::Unavailable("AI service is temporarily unavailable. Please try again later.".into())
            }
            AiError::InvalidRequest(_) => Self::BadRequest("Invalid request to AI service.".into()),
            AiError::EmptyResponse => Self::Upstream("AI service returned an empty response".into()),
            AiError::Unauthorized | AiError::Provider(_) | AiError::Transport(_) => {
                Self::Upstream(format!("AI service error: {err}"))
            }
        }
    }
}

impl From<PlanParseError> for ApiError {
    fn from(err: PlanParseError) -> Self {
        tracing::warn!("Rejected AI roadmap: {err}");
        match err {
            PlanParseError::NoJson | PlanParseError::InvalidJson(_) => {
                Self::Upstream("Failed to parse AI response into JSON".into())
            }
            PlanParseError::MissingDailyPlan => {
                Self::Upstream("Invalid roadmap structure received from AI".into())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported => Self::BadRequest(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Token(_) => Self::Unauthorized("Unauthorized access, invalid token".into()),
            AuthError::NotConfigured(what) => Self::Unavailable(format!("{what} is not configured")),
            other => Self::Internal(other.into()),
        }
    }
}

// ============================================================
// Extractor rejections
// ============================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::BadRequest("Invalid id".into())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}
