//! Domain-level error taxonomy.
//!
//! Every business-rule violation raised by the domain or service layers is a
//! [`DomainError`] tagged with one of the closed [`ErrorKind`] variants.
//! These errors are transport agnostic; the HTTP adapter owns the mapping to
//! status codes and response payloads.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of business-failure categories.
///
/// Each kind maps to exactly one external status code at the presentation
/// boundary; anything the taxonomy does not describe belongs under
/// [`ErrorKind::Internal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The referenced entity does not exist.
    NotFound,
    /// The actor lacks rights over the entity.
    PermissionDenied,
    /// Uniqueness or state conflict.
    Conflict,
    /// Input violates a business rule.
    Validation,
    /// Actor identity or credential is invalid or absent.
    Authentication,
    /// Any domain failure not covered by a more specific kind.
    Internal,
}

impl ErrorKind {
    /// Stable fallback classification code for errors constructed without an
    /// explicit one.
    pub const fn default_code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Internal => "internal",
        }
    }
}

type SourceError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Typed failure raised by domain and service code.
///
/// Carries a human-readable message, an optional machine-readable
/// classification code, and an optional source error so wrapped lower-level
/// failures stay discoverable through the standard error chain.
///
/// ## Invariants
/// - `code`, when present, is never empty: [`DomainError::with_code`]
///   normalizes empty input away, and [`DomainError::code`] falls back to the
///   kind's default.
#[derive(Debug, Clone)]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    code: Option<String>,
    source: Option<SourceError>,
}

impl DomainError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Convenience constructor for [`ErrorKind::PermissionDenied`].
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Convenience constructor for [`ErrorKind::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Convenience constructor for [`ErrorKind::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Convenience constructor for [`ErrorKind::Authentication`].
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Convenience constructor for [`ErrorKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach a classification code distinguishing this failure from others
    /// of the same kind (e.g. `email_taken` vs `username_taken`).
    ///
    /// An empty or whitespace-only code is indistinguishable from "no code"
    /// and is normalized to absent, so [`Self::code`] serves the kind-derived
    /// default instead.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.code = if code.trim().is_empty() {
            None
        } else {
            Some(code)
        };
        self
    }

    /// Record the lower-level failure this error wraps.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// The taxonomy kind this error belongs to.
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Machine-readable classification code.
    ///
    /// Returns the explicit code when one was attached, otherwise the kind's
    /// default. Never empty.
    pub fn code(&self) -> &str {
        self.code
            .as_deref()
            .unwrap_or_else(|| self.kind.default_code())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct FakeIoError;

    #[rstest]
    #[case(ErrorKind::NotFound, "not_found")]
    #[case(ErrorKind::PermissionDenied, "permission_denied")]
    #[case(ErrorKind::Conflict, "conflict")]
    #[case(ErrorKind::Validation, "validation")]
    #[case(ErrorKind::Authentication, "authentication")]
    #[case(ErrorKind::Internal, "internal")]
    fn default_code_follows_kind(#[case] kind: ErrorKind, #[case] expected: &str) {
        let error = DomainError::new(kind, "boom");
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn explicit_code_wins_over_default() {
        let error = DomainError::conflict("email already registered").with_code("email_taken");
        assert_eq!(error.code(), "email_taken");
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_code_is_normalized_to_default(#[case] code: &str) {
        let error = DomainError::validation("bad input").with_code(code);
        assert_eq!(error.code(), "validation");
    }

    #[rstest]
    fn source_chain_keeps_original_cause() {
        let error = DomainError::internal("database unavailable").with_source(FakeIoError);
        let source = std::error::Error::source(&error).expect("source present");
        assert_eq!(source.to_string(), "connection refused");
    }

    #[rstest]
    fn display_shows_message_only() {
        let error = DomainError::not_found("article missing").with_code("article_not_found");
        assert_eq!(error.to_string(), "article missing");
    }
}
