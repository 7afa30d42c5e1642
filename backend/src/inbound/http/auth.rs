//! Token authentication at the HTTP boundary.
//!
//! Issues and verifies the bearer tokens the API hands out at registration
//! and login, and exposes the [`AuthUser`] / [`MaybeAuthUser`] extractors
//! handlers declare to require or optionally accept a caller identity.
//! Domain and service code never see tokens, only user ids.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

use super::error::{ApiError, ApiResult};

/// Token issuance parameters, shared with handlers via `web::Data`.
#[derive(Clone)]
pub struct TokenSettings {
    secret: String,
    ttl_minutes: i64,
}

impl TokenSettings {
    /// Create settings from the signing secret and token lifetime.
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes,
        }
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret.
        f.debug_struct("TokenSettings")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
}

/// Issue a signed token for `user_id`.
pub fn issue_token(user_id: Uuid, settings: &TokenSettings) -> Result<String, DomainError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::minutes(settings.ttl_minutes)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|err| DomainError::internal("failed to issue token").with_source(err))
}

fn invalid_token() -> DomainError {
    DomainError::authentication("invalid or expired token").with_code("invalid_token")
}

/// Verify a token's signature and expiry, returning the subject user id.
pub fn verify_token(token: &str, settings: &TokenSettings) -> Result<Uuid, DomainError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| invalid_token().with_source(err))?;
    Uuid::parse_str(&data.claims.sub).map_err(|err| invalid_token().with_source(err))
}

/// Pull the token out of an `Authorization` header value.
///
/// Accepts both `Token <jwt>` (the blogging API contract) and
/// `Bearer <jwt>`.
fn token_from_header(value: &str) -> Option<&str> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> ApiResult<Option<Uuid>> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        ApiError::from(
            DomainError::authentication("malformed authorization header")
                .with_code("invalid_token"),
        )
    })?;
    let token = token_from_header(value).ok_or_else(|| {
        ApiError::from(
            DomainError::authentication("unsupported authorization scheme")
                .with_code("invalid_token"),
        )
    })?;
    let settings = req
        .app_data::<web::Data<TokenSettings>>()
        .ok_or_else(|| ApiError::from(DomainError::internal("token settings not configured")))?;
    let user_id = verify_token(token, settings).map_err(ApiError::from)?;
    Ok(Some(user_id))
}

/// Extractor for endpoints that require an authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<ApiResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            user.map(|user_id| Self { user_id }).ok_or_else(|| {
                ApiError::from(
                    DomainError::authentication("authentication required")
                        .with_code("missing_token"),
                )
            })
        }))
    }
}

/// Extractor for endpoints that personalize output when a token is present.
///
/// A missing header yields `None`; a present but invalid token is still an
/// authentication error.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<Uuid>);

impl MaybeAuthUser {
    /// The authenticated user id, if any.
    pub const fn user_id(&self) -> Option<Uuid> {
        self.0
    }
}

impl FromRequest for MaybeAuthUser {
    type Error = ApiError;
    type Future = Ready<ApiResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Self))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test as actix_test, App, HttpResponse};
    use rstest::rstest;

    use super::super::error::ApiResult;
    use super::*;

    fn settings() -> TokenSettings {
        TokenSettings::new("test-secret", 60)
    }

    #[rstest]
    fn token_round_trips_subject() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, &settings()).expect("token issued");
        let verified = verify_token(&token, &settings()).expect("token verifies");
        assert_eq!(verified, user_id);
    }

    #[rstest]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), &TokenSettings::new("other", 60))
            .expect("token issued");
        let error = verify_token(&token, &settings()).expect_err("rejected");
        assert_eq!(error.code(), "invalid_token");
    }

    #[rstest]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encoded");
        let error = verify_token(&token, &settings()).expect_err("expired");
        assert_eq!(error.code(), "invalid_token");
    }

    #[rstest]
    #[case("Token abc", Some("abc"))]
    #[case("Bearer abc", Some("abc"))]
    #[case("Basic abc", None)]
    #[case("Token ", None)]
    fn header_scheme_parsing(#[case] value: &str, #[case] expected: Option<&str>) {
        assert_eq!(token_from_header(value), expected);
    }

    async fn whoami(user: AuthUser) -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok().body(user.user_id.to_string()))
    }

    async fn maybe_whoami(user: MaybeAuthUser) -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok().body(
            user.user_id()
                .map_or_else(|| "anonymous".to_owned(), |id| id.to_string()),
        ))
    }

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(settings()))
            .route("/whoami", web::get().to(whoami))
            .route("/maybe", web::get().to(maybe_whoami))
    }

    #[actix_web::test]
    async fn required_auth_accepts_valid_token() {
        let app = actix_test::init_service(test_app()).await;
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, &settings()).expect("token");

        let req = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Token {token}")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let body = actix_test::read_body(res).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn required_auth_rejects_missing_header() {
        let app = actix_test::init_service(test_app()).await;
        let req = actix_test::TestRequest::get().uri("/whoami").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn optional_auth_defaults_to_anonymous() {
        let app = actix_test::init_service(test_app()).await;
        let req = actix_test::TestRequest::get().uri("/maybe").to_request();
        let res = actix_test::call_service(&app, req).await;
        let body = actix_test::read_body(res).await;
        assert_eq!(body, b"anonymous".as_ref());
    }

    #[actix_web::test]
    async fn optional_auth_still_rejects_garbage_tokens() {
        let app = actix_test::init_service(test_app()).await;
        let req = actix_test::TestRequest::get()
            .uri("/maybe")
            .insert_header((header::AUTHORIZATION, "Token not-a-jwt"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
