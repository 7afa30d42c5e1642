//! Domain entities, validation rules, the error taxonomy, and storage ports.
//!
//! Everything in this module is transport- and storage-agnostic: entities are
//! plain data with validated newtype components, business failures are
//! [`DomainError`] values from the closed taxonomy, and persistence is
//! reached only through the traits in [`ports`].

pub mod article;
pub mod comment;
pub mod error;
pub mod ports;
pub mod profile;
pub mod user;

pub use self::article::{
    Article, ArticleChanges, ArticleDraft, ArticleValidationError, Slug, TAGS_MAX,
};
pub use self::comment::{Comment, CommentDraft, CommentValidationError};
pub use self::error::{DomainError, ErrorKind};
pub use self::profile::Profile;
pub use self::user::{
    Email, User, UserChanges, UserDraft, UserValidationError, Username, PASSWORD_MIN,
};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
