use std::{error::Error as _, time::Duration};

use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{config::AppConfig, models::ErrorBody};

pub const POST_NOT_FOUND: &str = "The post with the specified ID does not exist.";
pub const ROUTE_NOT_FOUND: &str = "The requested resource does not exist.";
pub const METHOD_NOT_ALLOWED: &str = "The requested method is not allowed for this resource.";

/// StoreError
///
/// Failure of a data-access call. Produced by the repositories and by the
/// timeout wrapper around them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store did not respond within {0:?}")]
    Timeout(Duration),
}

/// ApiError
///
/// Everything a request can fail with. Validation rejects with `BadRequest` or
/// `NotFound` before the handler body runs; store failures are wrapped into
/// `Internal` at the handler boundary with an operation-specific message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, source: StoreError) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }

    pub fn post_not_found() -> Self {
        Self::NotFound(POST_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error message followed by every `source()` in its chain, one cause
    /// per line. This is what ends up in the `stack` field when it is exposed.
    pub fn stack(&self) -> String {
        let mut stack = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            stack.push_str("\ncaused by: ");
            stack.push_str(&err.to_string());
            cause = err.source();
        }
        stack
    }
}

/// ErrorReport
///
/// Response extension left behind by `ApiError::into_response`. The body is
/// written later by `format_errors`, which is the only place that knows whether
/// the stack may be shown.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub stack: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal { message, source } => {
                tracing::error!(error = ?source, "{message}");
            }
            _ => tracing::debug!(status = status.as_u16(), "request rejected: {self}"),
        }

        let report = ErrorReport {
            message: self.to_string(),
            stack: self.stack(),
        };
        (status, Extension(report)).into_response()
    }
}

/// format_errors
///
/// Terminal middleware of the error path. Any response carrying an `ErrorReport`
/// gets its body replaced by `ErrorBody`, keeping the status code. The stack is
/// included only when `AppConfig::expose_error_stack` is on.
pub async fn format_errors(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let body = ErrorBody {
        message: report.message,
        stack: config.expose_error_stack.then_some(report.stack),
    };
    (response.status(), Json(body)).into_response()
}
