//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint and response schema. The
//! generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ErrorKind;
use crate::inbound::http::schemas::{ArticleDto, CommentDto, ProfileDto, ProfileDtoWrapper};
use crate::inbound::http::{articles, comments, error::ApiError, health, profiles, tags, users};

/// Register the token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "Token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "API token issued by POST /api/users/login, sent as `Token <jwt>`.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Conduit backend API",
        description = "Blogging platform REST interface: accounts, articles, comments, tags, and social relationships."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("Token" = [])),
    paths(
        users::register,
        users::login,
        users::current_user,
        users::update_user,
        profiles::get_profile,
        profiles::follow,
        profiles::unfollow,
        articles::list_articles,
        articles::feed,
        articles::get_article,
        articles::create_article,
        articles::update_article,
        articles::delete_article,
        articles::favorite,
        articles::unfavorite,
        comments::add_comment,
        comments::list_comments,
        comments::delete_comment,
        tags::list_tags,
        health::ready,
        health::live,
    ),
    components(schemas(
        ApiError,
        ErrorKind,
        ProfileDto,
        ProfileDtoWrapper,
        ArticleDto,
        CommentDto,
        users::RegisterRequest,
        users::RegisterUser,
        users::LoginRequest,
        users::LoginUser,
        users::UpdateUserRequest,
        users::UpdateUserFields,
        users::UserResponse,
        users::UserBody,
        articles::ArticleResponse,
        articles::ArticlesResponse,
        articles::CreateArticleRequest,
        articles::CreateArticleFields,
        articles::UpdateArticleRequest,
        articles::UpdateArticleFields,
        comments::AddCommentRequest,
        comments::AddCommentFields,
        comments::CommentResponse,
        comments::CommentsResponse,
        tags::TagsResponse,
    )),
    tags(
        (name = "users", description = "Account registration and authentication"),
        (name = "profiles", description = "Public profiles and follow relationships"),
        (name = "articles", description = "Articles, listings, and favorites"),
        (name = "comments", description = "Article comments"),
        (name = "tags", description = "Tag inventory"),
        (name = "health", description = "Probe endpoints")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_includes_core_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/users",
            "/api/users/login",
            "/api/user",
            "/api/profiles/{username}",
            "/api/articles",
            "/api/articles/feed",
            "/api/articles/{slug}",
            "/api/articles/{slug}/comments",
            "/api/tags",
            "/health/ready",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.keys().any(|name| name.contains("ApiError")));
    }
}
