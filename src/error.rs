//! Error types for the PyPI cache service
//!
//! Provides the closed error taxonomy surfaced by upstream queries and
//! request validation. The cache store and dispatcher never produce these.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == PyPI Error Enum ==
/// Unified error type for upstream queries and validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PypiError {
    /// Upstream resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Upstream rejected the request because of its own rate limit
    #[error("Rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimited {
        /// Seconds suggested by the `Retry-After` header, if any
        retry_after: Option<u64>,
    },

    /// Any other non-2xx response or a transport failure
    #[error("{message}")]
    Upstream {
        /// HTTP status, absent for transport-level failures
        status: Option<u16>,
        message: String,
    },

    /// Caller-supplied argument is malformed
    #[error("Invalid {field}: '{value}' - {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(". Retry after {} seconds", secs),
        None => String::new(),
    }
}

impl PypiError {
    /// Builds a validation error for the given field.
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PypiError::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for PypiError {
    fn into_response(self) -> Response {
        let status = match &self {
            PypiError::NotFound(_) => StatusCode::NOT_FOUND,
            PypiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            PypiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            PypiError::Validation { .. } => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        let mut response = (status, body).into_response();
        if let PypiError::RateLimited {
            retry_after: Some(secs),
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, PypiError>;
