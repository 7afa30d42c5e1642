//! Comment endpoints.

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CommentDraft, CommentValidationError, DomainError};
use crate::service;

use super::auth::{AuthUser, MaybeAuthUser};
use super::error::{ApiError, ApiResult};
use super::schemas::CommentDto;
use super::state::AppState;

/// Envelope for single-comment responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub comment: CommentDto,
}

/// Envelope for comment listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDto>,
}

/// Comment creation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub comment: AddCommentFields,
}

/// Comment creation fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentFields {
    #[schema(example = "Great article!")]
    pub body: String,
}

fn map_comment_validation(error: CommentValidationError) -> ApiError {
    ApiError::from(DomainError::validation(error.to_string()))
        .with_details(json!({ "field": "body" }))
}

/// Post a comment on an article.
#[utoipa::path(
    post,
    path = "/api/articles/{slug}/comments",
    params(("slug" = String, Path, description = "Article slug")),
    request_body = AddCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["comments"],
    operation_id = "addComment"
)]
#[post("/articles/{slug}/comments")]
pub async fn add_comment(
    state: web::Data<AppState>,
    auth: AuthUser,
    slug: web::Path<String>,
    payload: web::Json<AddCommentRequest>,
) -> ApiResult<web::Json<CommentResponse>> {
    let draft =
        CommentDraft::new(payload.into_inner().comment.body).map_err(map_comment_validation)?;
    let view = service::comments::add_comment(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        slug.into_inner(),
        draft,
    )
    .await?;
    Ok(web::Json(CommentResponse {
        comment: view.into(),
    }))
}

/// List an article's comments, oldest first.
#[utoipa::path(
    get,
    path = "/api/articles/{slug}/comments",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Comments", body = CommentsResponse),
        (status = 404, description = "Article not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/articles/{slug}/comments")]
pub async fn list_comments(
    state: web::Data<AppState>,
    viewer: MaybeAuthUser,
    slug: web::Path<String>,
) -> ApiResult<web::Json<CommentsResponse>> {
    let views =
        service::comments::list_comments(&state.pool, viewer.user_id(), slug.into_inner()).await?;
    Ok(web::Json(CommentsResponse {
        comments: views.into_iter().map(CommentDto::from).collect(),
    }))
}

/// Delete a comment; only its author may.
#[utoipa::path(
    delete,
    path = "/api/articles/{slug}/comments/{id}",
    params(
        ("slug" = String, Path, description = "Article slug"),
        ("id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the comment author", body = ApiError),
        (status = 404, description = "Article or comment not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/articles/{slug}/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<(String, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (slug, comment_id) = path.into_inner();
    service::comments::delete_comment(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        slug,
        comment_id,
    )
    .await?;
    Ok(HttpResponse::Ok().finish())
}
