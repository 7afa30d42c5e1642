//! Profile endpoints: lookup, follow, unfollow.

use actix_web::{delete, get, post, web};

use crate::service;

use super::auth::{AuthUser, MaybeAuthUser};
use super::error::{ApiError, ApiResult};
use super::schemas::ProfileDtoWrapper;
use super::state::AppState;

/// Look up a profile by username.
#[utoipa::path(
    get,
    path = "/api/profiles/{username}",
    params(("username" = String, Path, description = "Profile username")),
    responses(
        (status = 200, description = "Profile", body = ProfileDtoWrapper),
        (status = 404, description = "Profile not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["profiles"],
    operation_id = "getProfile",
    security([])
)]
#[get("/profiles/{username}")]
pub async fn get_profile(
    state: web::Data<AppState>,
    viewer: MaybeAuthUser,
    username: web::Path<String>,
) -> ApiResult<web::Json<ProfileDtoWrapper>> {
    let profile =
        service::profiles::get_profile(&state.pool, viewer.user_id(), username.into_inner())
            .await?;
    Ok(web::Json(profile.into()))
}

/// Follow a user.
#[utoipa::path(
    post,
    path = "/api/profiles/{username}/follow",
    params(("username" = String, Path, description = "Profile username")),
    responses(
        (status = 200, description = "Now following", body = ProfileDtoWrapper),
        (status = 400, description = "Cannot follow yourself", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Profile not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["profiles"],
    operation_id = "followUser"
)]
#[post("/profiles/{username}/follow")]
pub async fn follow(
    state: web::Data<AppState>,
    auth: AuthUser,
    username: web::Path<String>,
) -> ApiResult<web::Json<ProfileDtoWrapper>> {
    let profile = service::profiles::follow(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        username.into_inner(),
    )
    .await?;
    Ok(web::Json(profile.into()))
}

/// Stop following a user.
#[utoipa::path(
    delete,
    path = "/api/profiles/{username}/follow",
    params(("username" = String, Path, description = "Profile username")),
    responses(
        (status = 200, description = "No longer following", body = ProfileDtoWrapper),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Profile not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["profiles"],
    operation_id = "unfollowUser"
)]
#[delete("/profiles/{username}/follow")]
pub async fn unfollow(
    state: web::Data<AppState>,
    auth: AuthUser,
    username: web::Path<String>,
) -> ApiResult<web::Json<ProfileDtoWrapper>> {
    let profile = service::profiles::unfollow(
        &state.pool,
        state.bus.as_ref(),
        auth.user_id,
        username.into_inner(),
    )
    .await?;
    Ok(web::Json(profile.into()))
}
