//! Article operations: CRUD, listings, the feed, and favorites.

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::article::validate_tags;
use crate::domain::ports::{ArticleFilter, ArticleStore, FollowerStore, TagStore, UserStore};
use crate::domain::{
    Article, ArticleChanges, ArticleDraft, ArticleValidationError, DomainError, DomainResult,
    Profile, Slug,
};
use crate::events::domain::{
    ArticleCreated, ArticleDeleted, ArticleFavorited, ArticleUnfavorited, ArticleUpdated,
};
use crate::events::EventPublisher;
use crate::outbound::persistence::DbPool;

use super::transaction::transactional;
use super::users::current_user_in;

/// An article decorated with everything the API returns alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleView {
    pub article: Article,
    pub author: Profile,
    pub favorited: bool,
    pub favorites_count: u64,
}

/// Listing parameters accepted by `GET /api/articles`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn article_not_found() -> DomainError {
    DomainError::not_found("article not found").with_code("article_not_found")
}

fn not_article_author() -> DomainError {
    DomainError::permission_denied("only the author may modify an article")
        .with_code("not_article_author")
}

fn map_validation(error: ArticleValidationError) -> DomainError {
    DomainError::validation(error.to_string())
}

fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .unwrap_or(crate::domain::ports::DEFAULT_LIST_LIMIT)
        .clamp(1, 100);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Pick a slug for `title` that no other article uses.
///
/// When the derived slug collides, a random hex suffix is appended; the
/// article's current slug (on update) is never treated as a collision.
async fn unique_slug<S>(store: &mut S, title: &str, current: Option<&Slug>) -> DomainResult<Slug>
where
    S: ArticleStore + ?Sized,
{
    let base = Slug::from_title(title).map_err(map_validation)?;
    if current == Some(&base) || !store.slug_exists(base.as_ref()).await? {
        return Ok(base);
    }
    for _ in 0..4 {
        let candidate = base.with_suffix(&format!("{:08x}", rand::random::<u32>()));
        if !store.slug_exists(candidate.as_ref()).await? {
            return Ok(candidate);
        }
    }
    Err(DomainError::conflict("could not allocate a unique slug").with_code("slug_exhausted"))
}

async fn fetch_article<S>(store: &mut S, slug: &str) -> DomainResult<Article>
where
    S: ArticleStore + ?Sized,
{
    store
        .article_by_slug(slug)
        .await?
        .ok_or_else(article_not_found)
}

/// Assemble the API view of one article from the viewer's perspective.
async fn build_view<S>(
    store: &mut S,
    article: Article,
    viewer: Option<Uuid>,
) -> DomainResult<ArticleView>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let author = store
        .user_by_id(article.author_id)
        .await?
        .ok_or_else(|| DomainError::internal("article author record is missing"))?;
    let (following, favorited) = match viewer {
        Some(viewer_id) => (
            store.is_following(viewer_id, author.id).await?,
            store.is_favorited(viewer_id, article.id).await?,
        ),
        None => (false, false),
    };
    let favorites_count = store.favorites_count(article.id).await?;
    Ok(ArticleView {
        author: Profile::of(&author, following),
        favorited,
        favorites_count,
        article,
    })
}

/// Create an article and publish `ArticleCreated`.
#[instrument(skip_all, fields(author_id = %author_id))]
pub async fn create_article(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    author_id: Uuid,
    draft: ArticleDraft,
) -> DomainResult<ArticleView> {
    let view = transactional(pool, move |uow| {
        Box::pin(create_article_in(uow, author_id, draft))
    })
    .await?;

    bus.publish_async(&ArticleCreated {
        article_id: view.article.id,
        author_id,
        slug: view.article.slug.to_string(),
    })
    .await;
    Ok(view)
}

pub(crate) async fn create_article_in<S>(
    store: &mut S,
    author_id: Uuid,
    draft: ArticleDraft,
) -> DomainResult<ArticleView>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let author = current_user_in(store, author_id).await?;
    let slug = unique_slug(store, &draft.title, None).await?;
    let now = Utc::now();
    let article = Article {
        id: Uuid::new_v4(),
        slug,
        title: draft.title,
        description: draft.description,
        body: draft.body,
        tag_list: draft.tag_list,
        author_id: author.id,
        created_at: now,
        updated_at: now,
    };
    store.insert_article(&article).await?;
    Ok(ArticleView {
        author: Profile::of(&author, false),
        favorited: false,
        favorites_count: 0,
        article,
    })
}

/// Fetch one article by slug.
pub async fn get_article(
    pool: &DbPool,
    viewer: Option<Uuid>,
    slug: String,
) -> DomainResult<ArticleView> {
    transactional(pool, move |uow| {
        Box::pin(get_article_in(uow, viewer, slug))
    })
    .await
}

pub(crate) async fn get_article_in<S>(
    store: &mut S,
    viewer: Option<Uuid>,
    slug: String,
) -> DomainResult<ArticleView>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let article = fetch_article(store, &slug).await?;
    build_view(store, article, viewer).await
}

/// Update an article (author only) and publish `ArticleUpdated`.
#[instrument(skip_all, fields(actor_id = %actor_id, slug = %slug))]
pub async fn update_article(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    actor_id: Uuid,
    slug: String,
    changes: ArticleChanges,
) -> DomainResult<ArticleView> {
    let updated_fields: Vec<String> = changes
        .updated_fields()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let view = transactional(pool, move |uow| {
        Box::pin(update_article_in(uow, actor_id, slug, changes))
    })
    .await?;

    bus.publish_async(&ArticleUpdated {
        article_id: view.article.id,
        author_id: view.article.author_id,
        updated_fields,
    })
    .await;
    Ok(view)
}

pub(crate) async fn update_article_in<S>(
    store: &mut S,
    actor_id: Uuid,
    slug: String,
    changes: ArticleChanges,
) -> DomainResult<ArticleView>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let mut article = fetch_article(store, &slug).await?;
    if article.author_id != actor_id {
        return Err(not_article_author());
    }

    if let Some(title) = changes.title {
        if title.trim().is_empty() {
            return Err(map_validation(ArticleValidationError::EmptyTitle));
        }
        if title != article.title {
            article.slug = unique_slug(store, &title, Some(&article.slug)).await?;
            article.title = title;
        }
    }
    if let Some(description) = changes.description {
        if description.trim().is_empty() {
            return Err(map_validation(ArticleValidationError::EmptyDescription));
        }
        article.description = description;
    }
    if let Some(body) = changes.body {
        if body.trim().is_empty() {
            return Err(map_validation(ArticleValidationError::EmptyBody));
        }
        article.body = body;
    }
    if let Some(tag_list) = changes.tag_list {
        article.tag_list = validate_tags(tag_list).map_err(map_validation)?;
    }
    article.updated_at = Utc::now();

    store.update_article(&article).await?;
    build_view(store, article, Some(actor_id)).await
}

/// Delete an article (author only) and publish `ArticleDeleted`.
#[instrument(skip_all, fields(actor_id = %actor_id, slug = %slug))]
pub async fn delete_article(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    actor_id: Uuid,
    slug: String,
) -> DomainResult<()> {
    let article_id = transactional(pool, move |uow| {
        Box::pin(delete_article_in(uow, actor_id, slug))
    })
    .await?;

    bus.publish_async(&ArticleDeleted {
        article_id,
        author_id: actor_id,
    })
    .await;
    Ok(())
}

pub(crate) async fn delete_article_in<S>(
    store: &mut S,
    actor_id: Uuid,
    slug: String,
) -> DomainResult<Uuid>
where
    S: ArticleStore + ?Sized,
{
    let article = fetch_article(store, &slug).await?;
    if article.author_id != actor_id {
        return Err(not_article_author());
    }
    store.delete_article(article.id).await?;
    Ok(article.id)
}

/// Favorite an article and publish `ArticleFavorited`.
#[instrument(skip_all, fields(user_id = %user_id, slug = %slug))]
pub async fn favorite(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    user_id: Uuid,
    slug: String,
) -> DomainResult<ArticleView> {
    let view = transactional(pool, move |uow| {
        Box::pin(favorite_in(uow, user_id, slug))
    })
    .await?;

    bus.publish_async(&ArticleFavorited {
        article_id: view.article.id,
        user_id,
    })
    .await;
    Ok(view)
}

pub(crate) async fn favorite_in<S>(
    store: &mut S,
    user_id: Uuid,
    slug: String,
) -> DomainResult<ArticleView>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let article = fetch_article(store, &slug).await?;
    store.insert_favorite(user_id, article.id).await?;
    build_view(store, article, Some(user_id)).await
}

/// Remove a favorite and publish `ArticleUnfavorited`.
#[instrument(skip_all, fields(user_id = %user_id, slug = %slug))]
pub async fn unfavorite(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    user_id: Uuid,
    slug: String,
) -> DomainResult<ArticleView> {
    let view = transactional(pool, move |uow| {
        Box::pin(unfavorite_in(uow, user_id, slug))
    })
    .await?;

    bus.publish_async(&ArticleUnfavorited {
        article_id: view.article.id,
        user_id,
    })
    .await;
    Ok(view)
}

pub(crate) async fn unfavorite_in<S>(
    store: &mut S,
    user_id: Uuid,
    slug: String,
) -> DomainResult<ArticleView>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let article = fetch_article(store, &slug).await?;
    store.delete_favorite(user_id, article.id).await?;
    build_view(store, article, Some(user_id)).await
}

/// List articles matching the query, newest first.
pub async fn list_articles(
    pool: &DbPool,
    viewer: Option<Uuid>,
    query: ListQuery,
) -> DomainResult<Vec<ArticleView>> {
    transactional(pool, move |uow| {
        Box::pin(list_articles_in(uow, viewer, query))
    })
    .await
}

pub(crate) async fn list_articles_in<S>(
    store: &mut S,
    viewer: Option<Uuid>,
    query: ListQuery,
) -> DomainResult<Vec<ArticleView>>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let (limit, offset) = clamp_page(query.limit, query.offset);

    // Unknown usernames in filters yield an empty page, not an error.
    let author_id = match &query.author {
        Some(username) => match store.user_by_username(username).await? {
            Some(user) => Some(user.id),
            None => return Ok(Vec::new()),
        },
        None => None,
    };
    let favorited_by = match &query.favorited {
        Some(username) => match store.user_by_username(username).await? {
            Some(user) => Some(user.id),
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    let filter = ArticleFilter {
        tag: query.tag,
        author_id,
        favorited_by,
        followed_by: None,
        limit,
        offset,
    };
    let articles = store.list_articles(&filter).await?;
    build_views(store, articles, viewer).await
}

/// Articles authored by users the viewer follows, newest first.
pub async fn feed(
    pool: &DbPool,
    viewer_id: Uuid,
    limit: Option<i64>,
    offset: Option<i64>,
) -> DomainResult<Vec<ArticleView>> {
    transactional(pool, move |uow| {
        Box::pin(feed_in(uow, viewer_id, limit, offset))
    })
    .await
}

pub(crate) async fn feed_in<S>(
    store: &mut S,
    viewer_id: Uuid,
    limit: Option<i64>,
    offset: Option<i64>,
) -> DomainResult<Vec<ArticleView>>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let (limit, offset) = clamp_page(limit, offset);
    let filter = ArticleFilter {
        followed_by: Some(viewer_id),
        limit,
        offset,
        ..ArticleFilter::default()
    };
    let articles = store.list_articles(&filter).await?;
    build_views(store, articles, Some(viewer_id)).await
}

async fn build_views<S>(
    store: &mut S,
    articles: Vec<Article>,
    viewer: Option<Uuid>,
) -> DomainResult<Vec<ArticleView>>
where
    S: ArticleStore + UserStore + FollowerStore + ?Sized,
{
    let mut views = Vec::with_capacity(articles.len());
    for article in articles {
        views.push(build_view(store, article, viewer).await?);
    }
    Ok(views)
}

/// All tags in use, alphabetically.
pub async fn list_tags(pool: &DbPool) -> DomainResult<Vec<String>> {
    transactional(pool, move |uow| Box::pin(list_tags_in(uow))).await
}

pub(crate) async fn list_tags_in<S>(store: &mut S) -> DomainResult<Vec<String>>
where
    S: TagStore + ?Sized,
{
    Ok(store.distinct_tags().await?)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::fakes::InMemoryStore;
    use super::*;
    use crate::domain::{Email, ErrorKind, User, Username};

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

    fn dragon_draft() -> ArticleDraft {
        ArticleDraft::new(
            "How to Train Your Dragon",
            "Ever wonder how?",
            "You have to believe",
            vec!["dragons".to_owned(), "training".to_owned()],
        )
        .expect("valid draft")
    }

    #[tokio::test]
    async fn create_derives_slug_from_title() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");

        let view = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("creation succeeds");

        assert_eq!(view.article.slug.as_ref(), "how-to-train-your-dragon");
        assert_eq!(view.favorites_count, 0);
        assert!(!view.favorited);
        assert_eq!(view.author.username.as_ref(), "jake");
    }

    #[tokio::test]
    async fn create_uniquifies_colliding_slugs() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");

        let first = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("first article");
        let second = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("second article");

        assert_ne!(first.article.slug, second.article.slug);
        assert!(second
            .article
            .slug
            .as_ref()
            .starts_with("how-to-train-your-dragon-"));
    }

    #[tokio::test]
    async fn update_by_non_author_is_denied() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let intruder = seeded_user(&mut store, "anna");
        let view = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("article");

        let changes = ArticleChanges {
            title: Some("Hijacked".to_owned()),
            ..ArticleChanges::default()
        };
        let error = update_article_in(
            &mut store,
            intruder.id,
            view.article.slug.to_string(),
            changes,
        )
        .await
        .expect_err("permission denied");

        assert_eq!(error.kind(), ErrorKind::PermissionDenied);
        assert_eq!(error.code(), "not_article_author");
    }

    #[tokio::test]
    async fn update_title_reslugs_article() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let view = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("article");

        let changes = ArticleChanges {
            title: Some("Did You Train Your Dragon?".to_owned()),
            ..ArticleChanges::default()
        };
        let updated = update_article_in(
            &mut store,
            author.id,
            view.article.slug.to_string(),
            changes,
        )
        .await
        .expect("update succeeds");

        assert_eq!(updated.article.slug.as_ref(), "did-you-train-your-dragon");
        assert_eq!(updated.article.body, "You have to believe");
    }

    #[tokio::test]
    async fn delete_requires_authorship_and_removes_article() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let view = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("article");
        let slug = view.article.slug.to_string();

        delete_article_in(&mut store, author.id, slug.clone())
            .await
            .expect("delete succeeds");
        assert!(store.articles.is_empty());

        let error = delete_article_in(&mut store, author.id, slug)
            .await
            .expect_err("already gone");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn favorite_flags_view_and_counts() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        let fan = seeded_user(&mut store, "anna");
        let view = create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("article");
        let slug = view.article.slug.to_string();

        let favorited = favorite_in(&mut store, fan.id, slug.clone())
            .await
            .expect("favorite succeeds");
        assert!(favorited.favorited);
        assert_eq!(favorited.favorites_count, 1);

        let unfavorited = unfavorite_in(&mut store, fan.id, slug)
            .await
            .expect("unfavorite succeeds");
        assert!(!unfavorited.favorited);
        assert_eq!(unfavorited.favorites_count, 0);
    }

    #[tokio::test]
    async fn list_filters_by_tag_and_unknown_author_is_empty() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("article");
        let other = ArticleDraft::new("On Rust", "memory", "safety", vec!["rust".to_owned()])
            .expect("valid");
        create_article_in(&mut store, author.id, other)
            .await
            .expect("article");

        let by_tag = list_articles_in(
            &mut store,
            None,
            ListQuery {
                tag: Some("rust".to_owned()),
                ..ListQuery::default()
            },
        )
        .await
        .expect("listing");
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].article.title, "On Rust");

        let by_ghost = list_articles_in(
            &mut store,
            None,
            ListQuery {
                author: Some("ghost".to_owned()),
                ..ListQuery::default()
            },
        )
        .await
        .expect("listing");
        assert!(by_ghost.is_empty());
    }

    #[tokio::test]
    async fn feed_only_shows_followed_authors() {
        let mut store = InMemoryStore::default();
        let jake = seeded_user(&mut store, "jake");
        let anna = seeded_user(&mut store, "anna");
        let reader = seeded_user(&mut store, "reader");
        store.follows.insert((reader.id, jake.id));

        create_article_in(&mut store, jake.id, dragon_draft())
            .await
            .expect("article");
        let hers = ArticleDraft::new("Hers", "d", "b", vec![]).expect("valid");
        create_article_in(&mut store, anna.id, hers)
            .await
            .expect("article");

        let feed = feed_in(&mut store, reader.id, None, None)
            .await
            .expect("feed");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].author.username.as_ref(), "jake");
        assert!(feed[0].author.following);
    }

    #[tokio::test]
    async fn tags_are_distinct_and_sorted() {
        let mut store = InMemoryStore::default();
        let author = seeded_user(&mut store, "jake");
        create_article_in(&mut store, author.id, dragon_draft())
            .await
            .expect("article");
        let more = ArticleDraft::new(
            "More",
            "d",
            "b",
            vec!["rust".to_owned(), "dragons".to_owned()],
        )
        .expect("valid");
        create_article_in(&mut store, author.id, more)
            .await
            .expect("article");

        let tags = list_tags_in(&mut store).await.expect("tags");
        assert_eq!(tags, vec!["dragons", "rust", "training"]);
    }
}
