//! Article aggregate, slug derivation, and tag rules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of tags accepted on one article.
pub const TAGS_MAX: usize = 10;

/// Validation errors for article fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    EmptyTitle,
    EmptyDescription,
    EmptyBody,
    EmptyTag,
    TooManyTags { max: usize },
    InvalidSlug,
    UnsluggableTitle,
}

impl fmt::Display for ArticleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::EmptyBody => write!(f, "body must not be empty"),
            Self::EmptyTag => write!(f, "tags must not be empty"),
            Self::TooManyTags { max } => write!(f, "articles may carry at most {max} tags"),
            Self::InvalidSlug => write!(
                f,
                "slug may only contain lowercase letters, digits, and hyphens"
            ),
            Self::UnsluggableTitle => {
                write!(f, "title contains no characters usable in a slug")
            }
        }
    }
}

impl std::error::Error for ArticleValidationError {}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// URL-safe article identifier.
///
/// Slugs are trimmed, non-empty strings of lowercase ASCII letters, digits,
/// and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`] from an existing value.
    pub fn new(value: impl Into<String>) -> Result<Self, ArticleValidationError> {
        let value = value.into();
        if !is_trimmed_non_empty(&value) || !has_allowed_slug_chars(&value) {
            return Err(ArticleValidationError::InvalidSlug);
        }
        Ok(Self(value))
    }

    /// Derive a slug from an article title.
    ///
    /// Alphanumeric runs are lowercased; everything between them collapses to
    /// a single hyphen. Titles with no usable characters are rejected.
    pub fn from_title(title: &str) -> Result<Self, ArticleValidationError> {
        let mut slug = String::with_capacity(title.len());
        let mut pending_separator = false;
        for ch in title.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }
        if slug.is_empty() {
            return Err(ArticleValidationError::UnsluggableTitle);
        }
        Ok(Self(slug))
    }

    /// Return a copy with `suffix` appended after a hyphen, used to uniquify
    /// a slug that collides with an existing article.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = ArticleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate a tag list: every tag trimmed and non-empty, bounded count.
pub fn validate_tags(tags: Vec<String>) -> Result<Vec<String>, ArticleValidationError> {
    if tags.len() > TAGS_MAX {
        return Err(ArticleValidationError::TooManyTags { max: TAGS_MAX });
    }
    for tag in &tags {
        if !is_trimmed_non_empty(tag) {
            return Err(ArticleValidationError::EmptyTag);
        }
    }
    Ok(tags)
}

/// Persisted article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: Uuid,
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated creation input.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

impl ArticleDraft {
    /// Validate creation input.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        tag_list: Vec<String>,
    ) -> Result<Self, ArticleValidationError> {
        let title = title.into();
        let description = description.into();
        let body = body.into();
        if title.trim().is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(ArticleValidationError::EmptyDescription);
        }
        if body.trim().is_empty() {
            return Err(ArticleValidationError::EmptyBody);
        }
        Ok(Self {
            title,
            description,
            body,
            tag_list: validate_tags(tag_list)?,
        })
    }
}

/// Partial update; absent fields keep current values.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

impl ArticleChanges {
    /// Names of the fields this change set touches, used for the
    /// `ArticleUpdated` event payload.
    pub fn updated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.body.is_some() {
            fields.push("body");
        }
        if self.tag_list.is_some() {
            fields.push("tagList");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("How to Train Your Dragon", "how-to-train-your-dragon")]
    #[case("  Spaces   everywhere  ", "spaces-everywhere")]
    #[case("C'est la vie!", "c-est-la-vie")]
    #[case("100% Rust", "100-rust")]
    fn from_title_collapses_to_hyphens(#[case] title: &str, #[case] expected: &str) {
        let slug = Slug::from_title(title).expect("sluggable title");
        assert_eq!(slug.as_ref(), expected);
    }

    #[rstest]
    fn from_title_rejects_symbol_only_titles() {
        assert_eq!(
            Slug::from_title("!!!").unwrap_err(),
            ArticleValidationError::UnsluggableTitle
        );
    }

    #[rstest]
    #[case("valid-slug-42")]
    #[case("a")]
    fn new_accepts_well_formed_slugs(#[case] value: &str) {
        assert!(Slug::new(value).is_ok());
    }

    #[rstest]
    #[case("Has-Upper")]
    #[case("has space")]
    #[case("")]
    #[case(" padded ")]
    fn new_rejects_malformed_slugs(#[case] value: &str) {
        assert_eq!(
            Slug::new(value).unwrap_err(),
            ArticleValidationError::InvalidSlug
        );
    }

    #[rstest]
    fn with_suffix_appends_after_hyphen() {
        let slug = Slug::new("how-to").expect("valid");
        assert_eq!(slug.with_suffix("x7f2").as_ref(), "how-to-x7f2");
    }

    #[rstest]
    fn validate_tags_bounds_count() {
        let tags = (0..=TAGS_MAX).map(|i| format!("tag{i}")).collect();
        assert_eq!(
            validate_tags(tags).unwrap_err(),
            ArticleValidationError::TooManyTags { max: TAGS_MAX }
        );
    }

    #[rstest]
    fn validate_tags_rejects_blank_entries() {
        let tags = vec!["rust".to_owned(), " ".to_owned()];
        assert_eq!(
            validate_tags(tags).unwrap_err(),
            ArticleValidationError::EmptyTag
        );
    }

    #[rstest]
    fn draft_requires_non_empty_fields() {
        let result = ArticleDraft::new("", "desc", "body", vec![]);
        assert_eq!(result.unwrap_err(), ArticleValidationError::EmptyTitle);
    }

    #[rstest]
    fn changes_report_touched_fields() {
        let changes = ArticleChanges {
            title: Some("New".to_owned()),
            body: Some("Text".to_owned()),
            ..ArticleChanges::default()
        };
        assert_eq!(changes.updated_fields(), vec!["title", "body"]);
    }
}
