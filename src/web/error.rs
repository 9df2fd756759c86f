// API error type and its HTTP mapping.
//
// Topic errors keep their taxonomy all the way to the response: bad requests
// are 400, "not enough signal" is 422, cancellation and timeouts are 504, and
// optimizer failures are a logged 500 with a generic message.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::topics::TopicError;
use crate::web::api_error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Topic(#[from] TopicError),

    #[error("topic extraction did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Topic(TopicError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Topic(TopicError::EmptyVocabulary { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Topic(TopicError::Cancelled { .. }) | ApiError::Timeout(_) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::Topic(TopicError::FitFailure { .. })
            | ApiError::Topic(TopicError::ShapeMismatch { .. })
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Topic(TopicError::FitFailure { .. })
            | ApiError::Topic(TopicError::ShapeMismatch { .. }) => {
                error!(error = %self, "Topic extraction failed");
                "topic extraction failed".to_string()
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                detail.clone()
            }
            _ => self.to_string(),
        };
        api_error(status, &message)
    }
}
