//! Tag inventory endpoint.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Envelope for the tag listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// All tags in use across articles.
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Tags", body = TagsResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["tags"],
    operation_id = "listTags",
    security([])
)]
#[get("/tags")]
pub async fn list_tags(state: web::Data<AppState>) -> ApiResult<web::Json<TagsResponse>> {
    let tags = service::articles::list_tags(&state.pool).await?;
    Ok(web::Json(TagsResponse { tags }))
}
