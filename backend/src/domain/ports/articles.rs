//! Ports for articles, favorites, and the tag inventory.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::article::Article;

use super::StoreError;

/// Default page size for article listings.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Filter for article listings. All identifier fields are already resolved
/// by the service layer; stores never look up usernames.
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    /// Only articles carrying this tag.
    pub tag: Option<String>,
    /// Only articles written by this author.
    pub author_id: Option<Uuid>,
    /// Only articles favorited by this user.
    pub favorited_by: Option<Uuid>,
    /// Only articles by authors this user follows (the feed).
    pub followed_by: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ArticleFilter {
    fn default() -> Self {
        Self {
            tag: None,
            author_id: None,
            favorited_by: None,
            followed_by: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// Persistence operations on articles and favorites.
#[async_trait]
pub trait ArticleStore: Send {
    /// Insert a new article record.
    async fn insert_article(&mut self, article: &Article) -> Result<(), StoreError>;

    /// Persist the current state of an existing article.
    async fn update_article(&mut self, article: &Article) -> Result<(), StoreError>;

    /// Delete an article; favorites and comments cascade.
    async fn delete_article(&mut self, id: Uuid) -> Result<(), StoreError>;

    /// Fetch an article by its slug.
    async fn article_by_slug(&mut self, slug: &str) -> Result<Option<Article>, StoreError>;

    /// Whether any article already uses `slug`.
    async fn slug_exists(&mut self, slug: &str) -> Result<bool, StoreError>;

    /// List articles matching `filter`, newest first.
    async fn list_articles(&mut self, filter: &ArticleFilter) -> Result<Vec<Article>, StoreError>;

    /// Number of users who favorited the article.
    async fn favorites_count(&mut self, article_id: Uuid) -> Result<u64, StoreError>;

    /// Whether `user_id` favorited the article.
    async fn is_favorited(&mut self, user_id: Uuid, article_id: Uuid)
        -> Result<bool, StoreError>;

    /// Record a favorite. Re-favoriting is a no-op.
    async fn insert_favorite(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), StoreError>;

    /// Remove a favorite if present.
    async fn delete_favorite(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), StoreError>;
}

/// Read access to the tag inventory.
#[async_trait]
pub trait TagStore: Send {
    /// All distinct tags across articles, alphabetically.
    async fn distinct_tags(&mut self) -> Result<Vec<String>, StoreError>;
}
