//! User account operations: registration, login, profile maintenance.

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::ports::UserStore;
use crate::domain::{DomainError, DomainResult, User, UserChanges, UserDraft};
use crate::events::domain::{UserLoggedIn, UserRegistered};
use crate::events::EventPublisher;
use crate::outbound::persistence::DbPool;

use super::transaction::transactional;

fn hash_password(password: &str) -> DomainResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|err| DomainError::internal("failed to hash password").with_source(err))
}

fn verify_password(password: &str, password_hash: &str) -> DomainResult<bool> {
    bcrypt::verify(password, password_hash)
        .map_err(|err| DomainError::internal("failed to verify password").with_source(err))
}

fn invalid_credentials() -> DomainError {
    // One message for unknown email and wrong password alike.
    DomainError::authentication("invalid email or password").with_code("invalid_credentials")
}

/// Register a new account and publish `UserRegistered`.
#[instrument(skip_all, fields(username = %draft.username))]
pub async fn register(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    draft: UserDraft,
) -> DomainResult<User> {
    let password_hash = hash_password(&draft.password)?;
    let user = transactional(pool, move |uow| {
        Box::pin(register_in(uow, draft, password_hash))
    })
    .await?;

    bus.publish_async(&UserRegistered {
        user_id: user.id,
        username: user.username.to_string(),
        email: user.email.to_string(),
    })
    .await;
    Ok(user)
}

pub(crate) async fn register_in<S>(
    store: &mut S,
    draft: UserDraft,
    password_hash: String,
) -> DomainResult<User>
where
    S: UserStore + ?Sized,
{
    let existing = store
        .user_by_username_or_email(draft.username.as_ref(), draft.email.as_ref())
        .await?;
    if let Some(taken) = existing {
        let code = if taken.username == draft.username {
            "username_taken"
        } else {
            "email_taken"
        };
        return Err(
            DomainError::conflict("an account with that username or email already exists")
                .with_code(code),
        );
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: draft.username,
        email: draft.email,
        password_hash,
        bio: String::new(),
        image: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await?;
    Ok(user)
}

/// Verify credentials and publish `UserLoggedIn`.
#[instrument(skip_all)]
pub async fn login(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    email: String,
    password: String,
) -> DomainResult<User> {
    let user = transactional(pool, move |uow| {
        Box::pin(login_in(uow, email, password))
    })
    .await?;

    bus.publish_async(&UserLoggedIn {
        user_id: user.id,
        email: user.email.to_string(),
    })
    .await;
    Ok(user)
}

pub(crate) async fn login_in<S>(
    store: &mut S,
    email: String,
    password: String,
) -> DomainResult<User>
where
    S: UserStore + ?Sized,
{
    let user = store
        .user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid_credentials());
    }
    Ok(user)
}

/// Load the account behind an authenticated token.
pub async fn current_user(pool: &DbPool, user_id: Uuid) -> DomainResult<User> {
    transactional(pool, move |uow| Box::pin(current_user_in(uow, user_id))).await
}

pub(crate) async fn current_user_in<S>(store: &mut S, user_id: Uuid) -> DomainResult<User>
where
    S: UserStore + ?Sized,
{
    store.user_by_id(user_id).await?.ok_or_else(|| {
        DomainError::authentication("account no longer exists").with_code("user_not_found")
    })
}

/// Apply a partial account update.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_user(
    pool: &DbPool,
    user_id: Uuid,
    changes: UserChanges,
) -> DomainResult<User> {
    let password_hash = match &changes.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    transactional(pool, move |uow| {
        Box::pin(update_user_in(uow, user_id, changes, password_hash))
    })
    .await
}

pub(crate) async fn update_user_in<S>(
    store: &mut S,
    user_id: Uuid,
    changes: UserChanges,
    password_hash: Option<String>,
) -> DomainResult<User>
where
    S: UserStore + ?Sized,
{
    let mut user = current_user_in(store, user_id).await?;

    if let Some(username) = changes.username {
        if username != user.username {
            if store.user_by_username(username.as_ref()).await?.is_some() {
                return Err(DomainError::conflict("username is already taken")
                    .with_code("username_taken"));
            }
            user.username = username;
        }
    }
    if let Some(email) = changes.email {
        if email != user.email {
            if store.user_by_email(email.as_ref()).await?.is_some() {
                return Err(
                    DomainError::conflict("email is already registered").with_code("email_taken")
                );
            }
            user.email = email;
        }
    }
    if let Some(hash) = password_hash {
        user.password_hash = hash;
    }
    if let Some(bio) = changes.bio {
        user.bio = bio;
    }
    if let Some(image) = changes.image {
        user.image = image;
    }
    user.updated_at = Utc::now();

    store.update_user(&user).await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::super::fakes::InMemoryStore;
    use super::*;
    use crate::domain::{Email, ErrorKind, Username};

    fn draft(username: &str, email: &str) -> UserDraft {
        UserDraft::new(username, email, "correct-horse-battery").expect("valid draft")
    }

    async fn registered(store: &mut InMemoryStore, username: &str, email: &str) -> User {
        let hash = hash_password("correct-horse-battery").expect("hash");
        register_in(store, draft(username, email), hash)
            .await
            .expect("registration succeeds")
    }

    #[tokio::test]
    async fn register_persists_user_with_empty_profile() {
        let mut store = InMemoryStore::default();
        let user = registered(&mut store, "jake", "jake@example.com").await;

        assert_eq!(user.bio, "");
        assert_eq!(user.image, None);
        assert_eq!(store.users.len(), 1);
    }

    #[rstest]
    #[case("jake", "other@example.com", "username_taken")]
    #[case("other", "jake@example.com", "email_taken")]
    #[tokio::test]
    async fn register_rejects_duplicate_handles(
        #[case] username: &str,
        #[case] email: &str,
        #[case] expected_code: &str,
    ) {
        let mut store = InMemoryStore::default();
        registered(&mut store, "jake", "jake@example.com").await;

        let error = register_in(&mut store, draft(username, email), "hash".to_owned())
            .await
            .expect_err("conflict");
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.code(), expected_code);
        assert_eq!(store.users.len(), 1);
    }

    #[tokio::test]
    async fn login_accepts_correct_password() {
        let mut store = InMemoryStore::default();
        let user = registered(&mut store, "jake", "jake@example.com").await;

        let logged_in = login_in(
            &mut store,
            "jake@example.com".to_owned(),
            "correct-horse-battery".to_owned(),
        )
        .await
        .expect("login succeeds");
        assert_eq!(logged_in.id, user.id);
    }

    #[rstest]
    #[case("jake@example.com", "wrong-password")]
    #[case("nobody@example.com", "correct-horse-battery")]
    #[tokio::test]
    async fn login_rejects_bad_credentials(#[case] email: &str, #[case] password: &str) {
        let mut store = InMemoryStore::default();
        registered(&mut store, "jake", "jake@example.com").await;

        let error = login_in(&mut store, email.to_owned(), password.to_owned())
            .await
            .expect_err("authentication failure");
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.code(), "invalid_credentials");
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let mut store = InMemoryStore::default();
        let user = registered(&mut store, "jake", "jake@example.com").await;

        let changes = UserChanges {
            bio: Some("I work at statefarm".to_owned()),
            image: Some(Some("https://example.com/jake.png".to_owned())),
            ..UserChanges::default()
        };
        let updated = update_user_in(&mut store, user.id, changes, None)
            .await
            .expect("update succeeds");

        assert_eq!(updated.bio, "I work at statefarm");
        assert_eq!(updated.username, user.username);
        assert_eq!(updated.email, user.email);
    }

    #[tokio::test]
    async fn update_rejects_taken_username() {
        let mut store = InMemoryStore::default();
        registered(&mut store, "jake", "jake@example.com").await;
        let other = registered(&mut store, "anna", "anna@example.com").await;

        let changes = UserChanges {
            username: Some(Username::new("jake").expect("valid")),
            ..UserChanges::default()
        };
        let error = update_user_in(&mut store, other.id, changes, None)
            .await
            .expect_err("conflict");
        assert_eq!(error.code(), "username_taken");
    }

    #[tokio::test]
    async fn update_allows_keeping_own_email() {
        let mut store = InMemoryStore::default();
        let user = registered(&mut store, "jake", "jake@example.com").await;

        let changes = UserChanges {
            email: Some(Email::new("jake@example.com").expect("valid")),
            ..UserChanges::default()
        };
        let updated = update_user_in(&mut store, user.id, changes, None)
            .await
            .expect("update succeeds");
        assert_eq!(updated.email.as_ref(), "jake@example.com");
    }

    #[tokio::test]
    async fn current_user_maps_missing_account_to_authentication() {
        let mut store = InMemoryStore::default();
        let error = current_user_in(&mut store, Uuid::new_v4())
            .await
            .expect_err("missing account");
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.code(), "user_not_found");
    }
}
