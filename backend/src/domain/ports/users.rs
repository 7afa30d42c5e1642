//! Ports for user accounts and follow relationships.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::User;

use super::StoreError;

/// Persistence operations on user accounts.
#[async_trait]
pub trait UserStore: Send {
    /// Insert a new account record.
    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError>;

    /// Persist the current state of an existing account.
    async fn update_user(&mut self, user: &User) -> Result<(), StoreError>;

    /// Fetch an account by identifier.
    async fn user_by_id(&mut self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Fetch an account by its unique username.
    async fn user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fetch an account by its unique email address.
    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fetch the first account matching either handle, used by registration
    /// uniqueness checks.
    async fn user_by_username_or_email(
        &mut self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Fetch all accounts whose identifiers appear in `ids`.
    async fn users_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<User>, StoreError>;
}

/// Persistence operations on the follower relation.
#[async_trait]
pub trait FollowerStore: Send {
    /// Record that `follower_id` follows `followee_id`. Inserting an
    /// existing edge is a no-op.
    async fn insert_follow(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<(), StoreError>;

    /// Remove the follow edge if present.
    async fn delete_follow(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<(), StoreError>;

    /// Whether `follower_id` currently follows `followee_id`.
    async fn is_following(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<bool, StoreError>;

    /// Subset of `candidate_ids` that `follower_id` follows, for batch
    /// `following` flags on article listings.
    async fn following_ids(
        &mut self,
        follower_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, StoreError>;
}
