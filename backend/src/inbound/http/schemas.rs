//! Response DTOs shared across handler modules.
//!
//! These mirror the blogging API's wire contract (camelCase fields,
//! `tagList`, RFC 3339 timestamps). Handlers wrap them in per-resource
//! envelopes (`{"user": ...}`, `{"article": ...}`, ...).

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Profile;
use crate::service::articles::ArticleView;
use crate::service::comments::CommentView;

/// Public profile as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    #[schema(example = "jake")]
    pub username: String,
    pub bio: String,
    #[schema(example = "https://api.realworld.io/images/smiley-cyrus.jpg")]
    pub image: Option<String>,
    pub following: bool,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            username: profile.username.into(),
            bio: profile.bio,
            image: profile.image,
            following: profile.following,
        }
    }
}

/// Article as returned by the API, including viewer-specific flags.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    #[schema(example = "how-to-train-your-dragon")]
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: u64,
    pub author: ProfileDto,
}

impl From<ArticleView> for ArticleDto {
    fn from(view: ArticleView) -> Self {
        Self {
            slug: view.article.slug.into(),
            title: view.article.title,
            description: view.article.description,
            body: view.article.body,
            tag_list: view.article.tag_list,
            created_at: view.article.created_at,
            updated_at: view.article.updated_at,
            favorited: view.favorited,
            favorites_count: view.favorites_count,
            author: view.author.into(),
        }
    }
}

impl From<Profile> for ProfileDtoWrapper {
    fn from(profile: Profile) -> Self {
        Self {
            profile: profile.into(),
        }
    }
}

/// Envelope for profile responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileDtoWrapper {
    pub profile: ProfileDto,
}

/// Comment as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: ProfileDto,
}

impl From<CommentView> for CommentDto {
    fn from(view: CommentView) -> Self {
        Self {
            id: view.comment.id,
            body: view.comment.body,
            created_at: view.comment.created_at,
            updated_at: view.comment.updated_at,
            author: view.author.into(),
        }
    }
}
