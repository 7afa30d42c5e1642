//! In-memory store implementations for service-level tests.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    ArticleFilter, ArticleStore, CommentStore, FollowerStore, StoreError, TagStore, UserStore,
};
use crate::domain::{Article, Comment, User};

/// Fake storage backing all store ports, mirroring what a committed
/// transaction would leave behind.
#[derive(Debug, Default)]
pub(crate) struct InMemoryStore {
    pub users: Vec<User>,
    pub follows: HashSet<(Uuid, Uuid)>,
    pub articles: Vec<Article>,
    /// (user_id, article_id) pairs.
    pub favorites: HashSet<(Uuid, Uuid)>,
    pub comments: Vec<Comment>,
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), StoreError> {
        if let Some(existing) = self.users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn user_by_id(&mut self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username.as_ref() == username)
            .cloned())
    }

    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email.as_ref() == email)
            .cloned())
    }

    async fn user_by_username_or_email(
        &mut self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username.as_ref() == username || u.email.as_ref() == email)
            .cloned())
    }

    async fn users_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FollowerStore for InMemoryStore {
    async fn insert_follow(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<(), StoreError> {
        self.follows.insert((follower_id, followee_id));
        Ok(())
    }

    async fn delete_follow(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<(), StoreError> {
        self.follows.remove(&(follower_id, followee_id));
        Ok(())
    }

    async fn is_following(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(self.follows.contains(&(follower_id, followee_id)))
    }

    async fn following_ids(
        &mut self,
        follower_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, StoreError> {
        Ok(candidate_ids
            .iter()
            .copied()
            .filter(|id| self.follows.contains(&(follower_id, *id)))
            .collect())
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn insert_article(&mut self, article: &Article) -> Result<(), StoreError> {
        self.articles.push(article.clone());
        Ok(())
    }

    async fn update_article(&mut self, article: &Article) -> Result<(), StoreError> {
        if let Some(existing) = self.articles.iter_mut().find(|a| a.id == article.id) {
            *existing = article.clone();
        }
        Ok(())
    }

    async fn delete_article(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.articles.retain(|a| a.id != id);
        self.favorites.retain(|(_, article_id)| *article_id != id);
        self.comments.retain(|c| c.article_id != id);
        Ok(())
    }

    async fn article_by_slug(&mut self, slug: &str) -> Result<Option<Article>, StoreError> {
        Ok(self
            .articles
            .iter()
            .find(|a| a.slug.as_ref() == slug)
            .cloned())
    }

    async fn slug_exists(&mut self, slug: &str) -> Result<bool, StoreError> {
        Ok(self.articles.iter().any(|a| a.slug.as_ref() == slug))
    }

    async fn list_articles(&mut self, filter: &ArticleFilter) -> Result<Vec<Article>, StoreError> {
        let mut matches: Vec<Article> = self
            .articles
            .iter()
            .filter(|a| {
                filter
                    .tag
                    .as_ref()
                    .is_none_or(|tag| a.tag_list.contains(tag))
            })
            .filter(|a| filter.author_id.is_none_or(|id| a.author_id == id))
            .filter(|a| {
                filter
                    .favorited_by
                    .is_none_or(|user| self.favorites.contains(&(user, a.id)))
            })
            .filter(|a| {
                filter
                    .followed_by
                    .is_none_or(|user| self.follows.contains(&(user, a.author_id)))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .collect())
    }

    async fn favorites_count(&mut self, article_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .favorites
            .iter()
            .filter(|(_, a)| *a == article_id)
            .count() as u64)
    }

    async fn is_favorited(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(self.favorites.contains(&(user_id, article_id)))
    }

    async fn insert_favorite(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), StoreError> {
        self.favorites.insert((user_id, article_id));
        Ok(())
    }

    async fn delete_favorite(
        &mut self,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), StoreError> {
        self.favorites.remove(&(user_id, article_id));
        Ok(())
    }
}

#[async_trait]
impl TagStore for InMemoryStore {
    async fn distinct_tags(&mut self) -> Result<Vec<String>, StoreError> {
        let mut tags: Vec<String> = self
            .articles
            .iter()
            .flat_map(|a| a.tag_list.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        tags.sort();
        Ok(tags)
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn insert_comment(&mut self, comment: &Comment) -> Result<(), StoreError> {
        self.comments.push(comment.clone());
        Ok(())
    }

    async fn comment_by_id(&mut self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments_for_article(
        &mut self,
        article_id: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut matches: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn delete_comment(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.comments.retain(|c| c.id != id);
        Ok(())
    }
}
