//! Port for article comments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::comment::Comment;

use super::StoreError;

/// Persistence operations on comments.
#[async_trait]
pub trait CommentStore: Send {
    /// Insert a new comment record.
    async fn insert_comment(&mut self, comment: &Comment) -> Result<(), StoreError>;

    /// Fetch a comment by identifier.
    async fn comment_by_id(&mut self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// All comments on an article, oldest first.
    async fn comments_for_article(
        &mut self,
        article_id: Uuid,
    ) -> Result<Vec<Comment>, StoreError>;

    /// Delete a comment.
    async fn delete_comment(&mut self, id: Uuid) -> Result<(), StoreError>;
}
