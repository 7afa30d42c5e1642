//! Translation of domain errors into HTTP responses.
//!
//! This is the single point in the service where a transport-level error is
//! constructed. [`status_for`] is a pure, total function over the closed
//! error taxonomy; [`ApiError`] is the response envelope Actix serializes.
//! Inner layers raise [`DomainError`] and never see status codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{DomainError, ErrorKind};
use crate::middleware::trace::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Fixed mapping from taxonomy kind to external status code.
///
/// Total over the closed set and pure by construction; callers decide
/// whether and when to log.
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error payload returned to API clients.
///
/// Internal failures are redacted on the wire: clients see a fixed message
/// and no details, while the trace id stays available for correlation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    kind: ErrorKind,
    /// Machine-readable classification code, never empty.
    #[schema(example = "article_not_found")]
    code: String,
    /// Human-readable message.
    #[schema(example = "article not found")]
    message: String,
    /// Correlation identifier for tracing this failure across systems.
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    /// Supplementary structured context, e.g. the offending field.
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Translate a domain error, capturing the ambient trace identifier.
    pub fn from_domain(error: &DomainError) -> Self {
        Self {
            kind: error.kind(),
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Taxonomy kind behind this response.
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Classification code.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        redacted.message = "Internal server error".to_owned();
        redacted.details = None;
        redacted
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::from_domain(&error)
    }
}

impl From<actix_web::Error> for ApiError {
    fn from(err: actix_web::Error) -> Self {
        // Unanticipated framework failures take the generic 500 path without
        // leaking implementation details to clients.
        error!(error = %err, "actix error promoted to API error");
        Self::from_domain(&DomainError::internal("Internal server error"))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind)
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header(("trace-id", id.clone()));
        }
        if matches!(self.kind, ErrorKind::Internal) {
            return builder.json(self.redacted());
        }
        builder.json(self)
    }
}
