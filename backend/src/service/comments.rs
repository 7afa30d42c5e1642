//! Comment operations.

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::ports::{ArticleStore, CommentStore, FollowerStore, UserStore};
use crate::domain::{Comment, CommentDraft, DomainError, DomainResult, Profile};
use crate::events::domain::{CommentAdded, CommentDeleted};
use crate::events::EventPublisher;
use crate::outbound::persistence::DbPool;

use super::transaction::transactional;
use super::users::current_user_in;

/// A comment paired with its author's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Profile,
}

fn article_not_found() -> DomainError {
    DomainError::not_found("article not found").with_code("article_not_found")
}

fn comment_not_found() -> DomainError {
    DomainError::not_found("comment not found").with_code("comment_not_found")
}

/// Post a comment on an article and publish `CommentAdded`.
#[instrument(skip_all, fields(author_id = %author_id, slug = %slug))]
pub async fn add_comment(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    author_id: Uuid,
    slug: String,
    draft: CommentDraft,
) -> DomainResult<CommentView> {
    let view = transactional(pool, move |uow| {
        Box::pin(add_comment_in(uow, author_id, slug, draft))
    })
    .await?;

    bus.publish_async(&CommentAdded {
        comment_id: view.comment.id,
        article_id: view.comment.article_id,
        author_id,
    })
    .await;
    Ok(view)
}

pub(crate) async fn add_comment_in<S>(
    store: &mut S,
    author_id: Uuid,
    slug: String,
    draft: CommentDraft,
) -> DomainResult<CommentView>
where
    S: CommentStore + ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let article = store
        .article_by_slug(&slug)
        .await?
        .ok_or_else(article_not_found)?;
    let author = current_user_in(store, author_id).await?;

    let now = Utc::now();
    let comment = Comment {
        id: Uuid::new_v4(),
        body: draft.body,
        article_id: article.id,
        author_id,
        created_at: now,
        updated_at: now,
    };
    store.insert_comment(&comment).await?;
    Ok(CommentView {
        comment,
        author: Profile::of(&author, false),
    })
}

/// All comments on an article, oldest first.
pub async fn list_comments(
    pool: &DbPool,
    viewer: Option<Uuid>,
    slug: String,
) -> DomainResult<Vec<CommentView>> {
    transactional(pool, move |uow| {
        Box::pin(list_comments_in(uow, viewer, slug))
    })
    .await
}

pub(crate) async fn list_comments_in<S>(
    store: &mut S,
    viewer: Option<Uuid>,
    slug: String,
) -> DomainResult<Vec<CommentView>>
where
    S: CommentStore + ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let article = store
        .article_by_slug(&slug)
        .await?
        .ok_or_else(article_not_found)?;
    let comments = store.comments_for_article(article.id).await?;

    let author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
    let authors = store.users_by_ids(&author_ids).await?;
    let following = match viewer {
        Some(viewer_id) => store.following_ids(viewer_id, &author_ids).await?,
        None => Vec::new(),
    };

    comments
        .into_iter()
        .map(|comment| {
            let author = authors
                .iter()
                .find(|user| user.id == comment.author_id)
                .ok_or_else(|| DomainError::internal("comment author record is missing"))?;
            let profile = Profile::of(author, following.contains(&author.id));
            Ok(CommentView {
                comment,
                author: profile,
            })
        })
        .collect()
}

/// Delete a comment (comment author only) and publish `CommentDeleted`.
#[instrument(skip_all, fields(actor_id = %actor_id, slug = %slug, comment_id = %comment_id))]
pub async fn delete_comment(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    actor_id: Uuid,
    slug: String,
    comment_id: Uuid,
) -> DomainResult<()> {
    let article_id = transactional(pool, move |uow| {
        Box::pin(delete_comment_in(uow, actor_id, slug, comment_id))
    })
    .await?;

    bus.publish_async(&CommentDeleted {
        comment_id,
        article_id,
        author_id: actor_id,
    })
    .await;
    Ok(())
}

pub(crate) async fn delete_comment_in<S>(
    store: &mut S,
    actor_id: Uuid,
    slug: String,
    comment_id: Uuid,
) -> DomainResult<Uuid>
where
    S: CommentStore + ArticleStore + ?Sized,
{
    let article = store
        .article_by_slug(&slug)
        .await?
        .ok_or_else(article_not_found)?;
    let comment = store
        .comment_by_id(comment_id)
        .await?
        .filter(|comment| comment.article_id == article.id)
        .ok_or_else(comment_not_found)?;
    if comment.author_id != actor_id {
        return Err(
            DomainError::permission_denied("only the comment author may delete it")
                .with_code("not_comment_author"),
        );
    }
    store.delete_comment(comment.id).await?;
    Ok(article.id)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::fakes::InMemoryStore;
    use super::*;
    use crate::domain::{Article, Email, ErrorKind, Slug, User, Username};

    fn seeded_user(store: &mut InMemoryStore, username: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: Username::new(username).expect("valid"),
            email: Email::new(format!("{username}@example.com")).expect("valid"),
            password_hash: "hash".to_owned(),
            bio: String::new(),
            image: None,
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());
        user
    }

    fn seeded_article(store: &mut InMemoryStore, author_id: Uuid) -> Article {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            slug: Slug::new("how-to").expect("valid"),
            title: "How to".to_owned(),
            description: "d".to_owned(),
            body: "b".to_owned(),
            tag_list: vec![],
            author_id,
            created_at: now,
            updated_at: now,
        };
        store.articles.push(article.clone());
        article
    }

    #[tokio::test]
    async fn add_comment_attaches_to_article() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let commenter = seeded_user(&mut store, "anna");
        seeded_article(&mut store, author.id);

        let view = add_comment_in(
            &mut store,
            commenter.id,
            "how-to".to_owned(),
            CommentDraft::new("First!").expect("valid"),
        )
        .await
        .expect("comment added");

        assert_eq!(view.author.username.as_ref(), "anna");
        assert_eq!(store.comments.len(), 1);
    }

    #[tokio::test]
    async fn commenting_on_missing_article_is_not_found() {
        let mut store = InMemoryStore::default();
        let commenter = seeded_user(&mut store, "anna");

        let error = add_comment_in(
            &mut store,
            commenter.id,
            "ghost".to_owned(),
            CommentDraft::new("hello").expect("valid"),
        )
        .await
        .expect_err("missing article");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.code(), "article_not_found");
    }

    #[tokio::test]
    async fn list_orders_comments_oldest_first_with_authors() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let commenter = seeded_user(&mut store, "anna");
        seeded_article(&mut store, author.id);

        for body in ["one", "two"] {
            add_comment_in(
                &mut store,
                commenter.id,
                "how-to".to_owned(),
                CommentDraft::new(body).expect("valid"),
            )
            .await
            .expect("comment added");
        }

        let views = list_comments_in(&mut store, None, "how-to".to_owned())
            .await
            .expect("listing");
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].comment.body, "one");
        assert_eq!(views[1].comment.body, "two");
        assert_eq!(views[0].author.username.as_ref(), "anna");
    }

    #[tokio::test]
    async fn delete_requires_comment_authorship() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let commenter = seeded_user(&mut store, "anna");
        seeded_article(&mut store, author.id);
        let view = add_comment_in(
            &mut store,
            commenter.id,
            "how-to".to_owned(),
            CommentDraft::new("mine").expect("valid"),
        )
        .await
        .expect("comment added");

        // The article author is not the comment author.
        let error = delete_comment_in(&mut store, author.id, "how-to".to_owned(), view.comment.id)
            .await
            .expect_err("denied");
        assert_eq!(error.kind(), ErrorKind::PermissionDenied);
        assert_eq!(error.code(), "not_comment_author");

        delete_comment_in(
            &mut store,
            commenter.id,
            "how-to".to_owned(),
            view.comment.id,
        )
        .await
        .expect("author may delete");
        assert!(store.comments.is_empty());
    }

    #[tokio::test]
    async fn delete_rejects_comment_from_another_article() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        seeded_article(&mut store, author.id);
        let now = Utc::now();
        let foreign = Comment {
            id: Uuid::new_v4(),
            body: "elsewhere".to_owned(),
            article_id: Uuid::new_v4(),
            author_id: author.id,
            created_at: now,
            updated_at: now,
        };
        store.comments.push(foreign.clone());

        let error = delete_comment_in(&mut store, author.id, "how-to".to_owned(), foreign.id)
            .await
            .expect_err("wrong article");
        assert_eq!(error.code(), "comment_not_found");
    }
}
