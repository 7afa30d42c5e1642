//! Comment entity.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Validation errors for comment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    EmptyBody,
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "comment body must not be empty"),
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Persisted comment attached to an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated comment input.
#[derive(Debug, Clone)]
pub struct CommentDraft {
    pub body: String,
}

impl CommentDraft {
    /// Validate comment input.
    pub fn new(body: impl Into<String>) -> Result<Self, CommentValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        Ok(Self { body })
    }
}
