//! Article endpoints: CRUD, listings, feed, favorites.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ArticleChanges, ArticleDraft, ArticleValidationError, DomainError};
use crate::service;
use crate::service::articles::ListQuery;

use super::auth::{AuthUser, MaybeAuthUser};
use super::error::{ApiError, ApiResult};
use super::schemas::ArticleDto;
use super::state::AppState;

/// Envelope for single-article responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub article: ArticleDto,
}

/// Envelope for article listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleDto>,
    pub articles_count: usize,
}

/// Article creation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateArticleRequest {
    pub article: CreateArticleFields,
}

/// Article creation fields.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleFields {
    #[schema(example = "How to Train Your Dragon")]
    pub title: String,
    #[schema(example = "Ever wonder how?")]
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// Article update request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateArticleRequest {
    pub article: UpdateArticleFields,
}

/// Updatable article fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

/// Query parameters for `GET /api/articles`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListArticlesParams {
    /// Only articles carrying this tag.
    pub tag: Option<String>,
    /// Only articles by this author username.
    pub author: Option<String>,
    /// Only articles favorited by this username.
    pub favorited: Option<String>,
    /// Page size, default 20, max 100.
    pub limit: Option<i64>,
    /// Page start.
    pub offset: Option<i64>,
}

/// Query parameters for `GET /api/articles/feed`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FeedParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn map_article_validation(error: ArticleValidationError) -> ApiError {
    let field = match &error {
        ArticleValidationError::EmptyTitle | ArticleValidationError::UnsluggableTitle => "title",
        ArticleValidationError::EmptyDescription => "description",
        ArticleValidationError::EmptyBody => "body",
        ArticleValidationError::EmptyTag | ArticleValidationError::TooManyTags { .. } => "tagList",
        ArticleValidationError::InvalidSlug => "slug",
    };
    ApiError::from(DomainError::validation(error.to_string()))
        .with_details(json!({ "field": field }))
}

fn articles_response(views: Vec<service::articles::ArticleView>) -> web::Json<ArticlesResponse> {
    let articles: Vec<ArticleDto> = views.into_iter().map(ArticleDto::from).collect();
    web::Json(ArticlesResponse {
        articles_count: articles.len(),
        articles,
    })
}

/// List articles, newest first.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ListArticlesParams),
    responses(
        (status = 200, description = "Articles", body = ArticlesResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "listArticles",
    security([])
)]
#[get("/articles")]
pub async fn list_articles(
    state: web::Data<AppState>,
    viewer: MaybeAuthUser,
    params: web::Query<ListArticlesParams>,
) -> ApiResult<web::Json<ArticlesResponse>> {
    let params = params.into_inner();
    let query = ListQuery {
        tag: params.tag,
        author: params.author,
        favorited: params.favorited,
        limit: params.limit,
        offset: params.offset,
    };
    let views = service::articles::list_articles(&state.pool, viewer.user_id(), query).await?;
    Ok(articles_response(views))
}

/// Articles by authors the caller follows.
#[utoipa::path(
    get,
    path = "/api/articles/feed",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed", body = ArticlesResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "getFeed"
)]
#[get("/articles/feed")]
pub async fn feed(
    state: web::Data<AppState>,
    auth: AuthUser,
    params: web::Query<FeedParams>,
) -> ApiResult<web::Json<ArticlesResponse>> {
    let views =
        service::articles::feed(&state.pool, auth.user_id, params.limit, params.offset).await?;
    Ok(articles_response(views))
}

/// Fetch one article by slug.
#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "getArticle",
    security([])
)]
#[get("/articles/{slug}")]
pub async fn get_article(
    state: web::Data<AppState>,
    viewer: MaybeAuthUser,
    slug: web::Path<String>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let view =
        service::articles::get_article(&state.pool, viewer.user_id(), slug.into_inner()).await?;
    Ok(web::Json(ArticleResponse {
        article: view.into(),
    }))
}

/// Create an article.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 200, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "createArticle"
)]
#[post("/articles")]
pub async fn create_article(
    state: web::Data<AppState>,
    auth: AuthUser,
    payload: web::Json<CreateArticleRequest>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let fields = payload.into_inner().article;
    let draft = ArticleDraft::new(fields.title, fields.description, fields.body, fields.tag_list)
        .map_err(map_article_validation)?;
    let view =
        service::articles::create_article(&state.pool, state.bus.as_ref(), auth.user_id, draft)
            .await?;
    Ok(web::Json(ArticleResponse {
        article: view.into(),
    }))
}

/// Update an article; only its author may.
#[utoipa::path(
    put,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the author", body = ApiError),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "updateArticle"
)]
#[put("/articles/{slug}")]
pub async fn update_article(
    state: web::Data<AppState>,
    auth: AuthUser,
    slug: web::Path<String>,
    payload: web::Json<UpdateArticleRequest>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let fields = payload.into_inner().article;
    let changes = ArticleChanges {
        title: fields.title,
        description: fields.description,
        body: fields.body,
        tag_list: fields.tag_list,
    };
    let view = service::articles::update_article(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        slug.into_inner(),
        changes,
    )
    .await?;
    Ok(web::Json(ArticleResponse {
        article: view.into(),
    }))
}

/// Delete an article; only its author may.
#[utoipa::path(
    delete,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the author", body = ApiError),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "deleteArticle"
)]
#[delete("/articles/{slug}")]
pub async fn delete_article(
    state: web::Data<AppState>,
    auth: AuthUser,
    slug: web::Path<String>,
) -> ApiResult<HttpResponse> {
    service::articles::delete_article(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        slug.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Favorite an article.
#[utoipa::path(
    post,
    path = "/api/articles/{slug}/favorite",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article favorited", body = ArticleResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "favoriteArticle"
)]
#[post("/articles/{slug}/favorite")]
pub async fn favorite(
    state: web::Data<AppState>,
    auth: AuthUser,
    slug: web::Path<String>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let view = service::articles::favorite(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        slug.into_inner(),
    )
    .await?;
    Ok(web::Json(ArticleResponse {
        article: view.into(),
    }))
}

/// Remove an article from favorites.
#[utoipa::path(
    delete,
    path = "/api/articles/{slug}/favorite",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Favorite removed", body = ArticleResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["articles"],
    operation_id = "unfavoriteArticle"
)]
#[delete("/articles/{slug}/favorite")]
pub async fn unfavorite(
    state: web::Data<AppState>,
    auth: AuthUser,
    slug: web::Path<String>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let view = service::articles::unfavorite(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        slug.into_inner(),
    )
    .await?;
    Ok(web::Json(ArticleResponse {
        article: view.into(),
    }))
}
