//! User and authentication endpoints.
//!
//! ```text
//! POST /api/users        {"user":{"username":"jake","email":"jake@x.io","password":"..."}}
//! POST /api/users/login  {"user":{"email":"jake@x.io","password":"..."}}
//! GET  /api/user
//! PUT  /api/user         {"user":{"bio":"..."}}
//! ```

use actix_web::{get, post, put, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    DomainError, Email, User, UserChanges, UserDraft, UserValidationError, Username, PASSWORD_MIN,
};
use crate::service;

use super::auth::{issue_token, AuthUser, TokenSettings};
use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub user: RegisterUser,
}

/// Registration fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUser {
    #[schema(example = "jake")]
    pub username: String,
    #[schema(example = "jake@example.com")]
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub user: LoginUser,
}

/// Login fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Account update request body. Absent fields keep their current values;
/// `"image": null` clears the image.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub user: UpdateUserFields,
}

/// Updatable account fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserFields {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    /// Absent means "keep", explicit null means "clear".
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
}

/// Keep absent-vs-null apart: an absent field stays `None` via `default`,
/// while a present field (including `null`) lands in `Some(..)`.
fn deserialize_clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Authenticated user envelope returned by every user endpoint.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct UserResponse {
    pub user: UserBody,
}

/// Authenticated user payload, including a fresh token.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct UserBody {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
}

fn user_response(user: User, settings: &TokenSettings) -> ApiResult<web::Json<UserResponse>> {
    let token = issue_token(user.id, settings)?;
    Ok(web::Json(UserResponse {
        user: UserBody {
            email: user.email.into(),
            token,
            username: user.username.into(),
            bio: user.bio,
            image: user.image,
        },
    }))
}

fn map_user_validation(error: UserValidationError) -> ApiError {
    let field = match &error {
        UserValidationError::EmptyUsername
        | UserValidationError::UsernameTooShort { .. }
        | UserValidationError::UsernameTooLong { .. }
        | UserValidationError::UsernameInvalidCharacters => "username",
        UserValidationError::InvalidEmail => "email",
        UserValidationError::PasswordTooShort { .. } => "password",
    };
    ApiError::from(DomainError::validation(error.to_string()))
        .with_details(json!({ "field": field }))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 409, description = "Username or email taken", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<AppState>,
    settings: web::Data<TokenSettings>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let body = payload.into_inner().user;
    let draft =
        UserDraft::new(body.username, body.email, body.password).map_err(map_user_validation)?;
    let user = service::users::register(&state.pool, state.bus.as_ref(), draft).await?;
    user_response(user, &settings)
}

/// Exchange credentials for a token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    settings: web::Data<TokenSettings>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let body = payload.into_inner().user;
    let user =
        service::users::login(&state.pool, state.bus.as_ref(), body.email, body.password).await?;
    user_response(user, &settings)
}

/// Current account behind the presented token.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<AppState>,
    settings: web::Data<TokenSettings>,
    auth: AuthUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = service::users::current_user(&state.pool, auth.user_id).await?;
    user_response(user, &settings)
}

/// Update the current account.
#[utoipa::path(
    put,
    path = "/api/user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 409, description = "Username or email taken", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/user")]
pub async fn update_user(
    state: web::Data<AppState>,
    settings: web::Data<TokenSettings>,
    auth: AuthUser,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let fields = payload.into_inner().user;

    let username = fields
        .username
        .map(Username::new)
        .transpose()
        .map_err(map_user_validation)?;
    let email = fields
        .email
        .map(Email::new)
        .transpose()
        .map_err(map_user_validation)?;
    if let Some(password) = &fields.password {
        if password.chars().count() < PASSWORD_MIN {
            return Err(map_user_validation(UserValidationError::PasswordTooShort {
                min: PASSWORD_MIN,
            }));
        }
    }

    let changes = UserChanges {
        username,
        email,
        password: fields.password,
        bio: fields.bio,
        image: fields.image,
    };
    let user = service::users::update_user(&state.pool, auth.user_id, changes).await?;
    user_response(user, &settings)
}
