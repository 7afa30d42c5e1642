//! Diesel-backed implementations of the article, favorite, and tag store
//! ports.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ArticleFilter, ArticleStore, StoreError, TagStore};
use crate::domain::Article;

use super::error_map::map_diesel_error;
use super::models::{ArticleChangesRow, ArticleRow, NewArticleRow, NewFavoriteRow};
use super::schema::{article_favorites, articles, followers};
use super::unit_of_work::UnitOfWork;

#[async_trait]
impl ArticleStore for UnitOfWork {
    async fn insert_article(&mut self, article: &Article) -> Result<(), StoreError> {
        diesel::insert_into(articles::table)
            .values(NewArticleRow::from(article))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_article(&mut self, article: &Article) -> Result<(), StoreError> {
        diesel::update(articles::table.find(article.id))
            .set(ArticleChangesRow::from(article))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_article(&mut self, id: Uuid) -> Result<(), StoreError> {
        // Favorites and comments go with it via ON DELETE CASCADE.
        diesel::delete(articles::table.find(id))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn article_by_slug(&mut self, slug: &str) -> Result<Option<Article>, StoreError> {
        let row: Option<ArticleRow> = articles::table
            .filter(articles::slug.eq(slug))
            .select(ArticleRow::as_select())
            .first(self.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Article::try_from).transpose()
    }

    async fn slug_exists(&mut self, slug: &str) -> Result<bool, StoreError> {
        diesel::select(diesel::dsl::exists(
            articles::table.filter(articles::slug.eq(slug)),
        ))
        .get_result(self.connection())
        .await
        .map_err(map_diesel_error)
    }

    async fn list_articles(&mut self, filter: &ArticleFilter) -> Result<Vec<Article>, StoreError> {
        let mut query = articles::table
            .select(ArticleRow::as_select())
            .order(articles::created_at.desc())
            .into_boxed();

        if let Some(tag) = &filter.tag {
            query = query.filter(articles::tag_list.contains(vec![tag.clone()]));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(articles::author_id.eq(author_id));
        }
        if let Some(user_id) = filter.favorited_by {
            let favorited = article_favorites::table
                .filter(article_favorites::user_id.eq(user_id))
                .select(article_favorites::article_id);
            query = query.filter(articles::id.eq_any(favorited));
        }
        if let Some(user_id) = filter.followed_by {
            let followed = followers::table
                .filter(followers::follower_id.eq(user_id))
                .select(followers::followee_id);
            query = query.filter(articles::author_id.eq_any(followed));
        }

        let rows: Vec<ArticleRow> = query
            .limit(filter.limit)
            .offset(filter.offset)
            .load(self.connection())
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Article::try_from).collect()
    }

    async fn favorites_count(&mut self, article_id: Uuid) -> Result<u64, StoreError> {
        let count: i64 = article_favorites::table
            .filter(article_favorites::article_id.eq(article_id))
            .count()
            .get_result(self.connection())
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count)
            .map_err(|_| StoreError::query(format!("negative favorites count: {count}")))
    }

    async fn is_favorited(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<bool, StoreError> {
        diesel::select(diesel::dsl::exists(
            article_favorites::table.filter(
                article_favorites::user_id
                    .eq(user_id)
                    .and(article_favorites::article_id.eq(article_id)),
            ),
        ))
        .get_result(self.connection())
        .await
        .map_err(map_diesel_error)
    }

    async fn insert_favorite(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), StoreError> {
        diesel::insert_into(article_favorites::table)
            .values(NewFavoriteRow {
                user_id,
                article_id,
            })
            .on_conflict_do_nothing()
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_favorite(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), StoreError> {
        diesel::delete(
            article_favorites::table.filter(
                article_favorites::user_id
                    .eq(user_id)
                    .and(article_favorites::article_id.eq(article_id)),
            ),
        )
        .execute(self.connection())
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }
}

/// Row shape for the distinct-tag aggregation query.
#[derive(QueryableByName)]
struct TagRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    tag: String,
}

#[async_trait]
impl TagStore for UnitOfWork {
    async fn distinct_tags(&mut self) -> Result<Vec<String>, StoreError> {
        // Tags are denormalized into an array column; unnest has no Diesel
        // DSL equivalent, so this one query stays raw.
        let rows: Vec<TagRow> =
            diesel::sql_query("SELECT DISTINCT unnest(tag_list) AS tag FROM articles ORDER BY tag")
                .load(self.connection())
                .await
                .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(|row| row.tag).collect())
    }
}
