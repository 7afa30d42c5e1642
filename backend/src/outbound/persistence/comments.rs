//! Diesel-backed implementation of the comment store port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentStore, StoreError};
use crate::domain::Comment;

use super::error_map::map_diesel_error;
use super::models::{CommentRow, NewCommentRow};
use super::schema::comments;
use super::unit_of_work::UnitOfWork;

#[async_trait]
impl CommentStore for UnitOfWork {
    async fn insert_comment(&mut self, comment: &Comment) -> Result<(), StoreError> {
        diesel::insert_into(comments::table)
            .values(NewCommentRow::from(comment))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn comment_by_id(&mut self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let row: Option<CommentRow> = comments::table
            .find(id)
            .select(CommentRow::as_select())
            .first(self.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Comment::from))
    }

    async fn comments_for_article(
        &mut self,
        article_id: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::article_id.eq(article_id))
            .order(comments::created_at.asc())
            .select(CommentRow::as_select())
            .load(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn delete_comment(&mut self, id: Uuid) -> Result<(), StoreError> {
        diesel::delete(comments::table.find(id))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
