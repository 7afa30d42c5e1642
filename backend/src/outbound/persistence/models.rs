//! Internal Diesel row structs and their conversions to domain types.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. A stored row that no longer satisfies
//! domain validation (e.g. a username written before a rule tightened) maps
//! to a query error rather than panicking.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::StoreError;
use crate::domain::{Article, Comment, Email, Slug, User, Username};

use super::schema::{article_favorites, articles, comments, followers, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: Username::new(row.username)
                .map_err(|err| StoreError::query(format!("corrupt user row: {err}")))?,
            email: Email::new(row.email)
                .map_err(|err| StoreError::query(format!("corrupt user row: {err}")))?,
            password_hash: row.password_hash,
            bio: row.bio,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub bio: &'a str,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            bio: user.bio.as_str(),
            image: user.image.as_deref(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Changeset persisting the full current state of an account.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangesRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub bio: &'a str,
    pub image: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserChangesRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            bio: user.bio.as_str(),
            image: user.image.as_deref(),
            updated_at: user.updated_at,
        }
    }
}

/// Insertable struct for follow edges.
#[derive(Debug, Insertable)]
#[diesel(table_name = followers)]
pub(crate) struct NewFollowerRow {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

/// Row struct for reading from the articles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = StoreError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            slug: Slug::new(row.slug)
                .map_err(|err| StoreError::query(format!("corrupt article row: {err}")))?,
            title: row.title,
            description: row.description,
            body: row.body,
            tag_list: row.tag_list,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new article records.
#[derive(Debug, Insertable)]
#[diesel(table_name = articles)]
pub(crate) struct NewArticleRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub tag_list: &'a [String],
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Article> for NewArticleRow<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            id: article.id,
            slug: article.slug.as_ref(),
            title: article.title.as_str(),
            description: article.description.as_str(),
            body: article.body.as_str(),
            tag_list: article.tag_list.as_slice(),
            author_id: article.author_id,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Changeset persisting the full current state of an article.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = articles)]
pub(crate) struct ArticleChangesRow<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub tag_list: &'a [String],
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Article> for ArticleChangesRow<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            slug: article.slug.as_ref(),
            title: article.title.as_str(),
            description: article.description.as_str(),
            body: article.body.as_str(),
            tag_list: article.tag_list.as_slice(),
            updated_at: article.updated_at,
        }
    }
}

/// Insertable struct for favorite edges.
#[derive(Debug, Insertable)]
#[diesel(table_name = article_favorites)]
pub(crate) struct NewFavoriteRow {
    pub user_id: Uuid,
    pub article_id: Uuid,
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub body: String,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            article_id: row.article_id,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating new comment records.
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub body: &'a str,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Comment> for NewCommentRow<'a> {
    fn from(comment: &'a Comment) -> Self {
        Self {
            id: comment.id,
            body: comment.body.as_str(),
            article_id: comment.article_id,
            author_id: comment.author_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
