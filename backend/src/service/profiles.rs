//! Profile operations: lookup and follow/unfollow.

use tracing::instrument;
use uuid::Uuid;

use crate::domain::ports::{FollowerStore, UserStore};
use crate::domain::{DomainError, DomainResult, Profile, User};
use crate::events::domain::{UserFollowed, UserUnfollowed};
use crate::events::EventPublisher;
use crate::outbound::persistence::DbPool;

use super::transaction::transactional;

fn profile_not_found() -> DomainError {
    DomainError::not_found("profile not found").with_code("profile_not_found")
}

pub(crate) async fn user_by_username_required<S>(
    store: &mut S,
    username: &str,
) -> DomainResult<User>
where
    S: UserStore + ?Sized,
{
    store
        .user_by_username(username)
        .await?
        .ok_or_else(profile_not_found)
}

/// Look up a profile from the viewer's perspective.
pub async fn get_profile(
    pool: &DbPool,
    viewer: Option<Uuid>,
    username: String,
) -> DomainResult<Profile> {
    transactional(pool, move |uow| {
        Box::pin(get_profile_in(uow, viewer, username))
    })
    .await
}

pub(crate) async fn get_profile_in<S>(
    store: &mut S,
    viewer: Option<Uuid>,
    username: String,
) -> DomainResult<Profile>
where
    S: UserStore + FollowerStore + ?Sized,
{
    let user = user_by_username_required(store, &username).await?;
    let following = match viewer {
        Some(viewer_id) => store.is_following(viewer_id, user.id).await?,
        None => false,
    };
    Ok(Profile::of(&user, following))
}

/// Start following `username` and publish `UserFollowed`.
#[instrument(skip_all, fields(follower = %follower_id, username = %username))]
pub async fn follow(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    follower_id: Uuid,
    username: String,
) -> DomainResult<Profile> {
    let (profile, followee_id) = transactional(pool, move |uow| {
        Box::pin(follow_in(uow, follower_id, username))
    })
    .await?;

    bus.publish_async(&UserFollowed {
        follower_id,
        followee_id,
    })
    .await;
    Ok(profile)
}

pub(crate) async fn follow_in<S>(
    store: &mut S,
    follower_id: Uuid,
    username: String,
) -> DomainResult<(Profile, Uuid)>
where
    S: UserStore + FollowerStore + ?Sized,
{
    let followee = user_by_username_required(store, &username).await?;
    if followee.id == follower_id {
        return Err(
            DomainError::validation("you cannot follow yourself").with_code("cannot_follow_self")
        );
    }
    store.insert_follow(follower_id, followee.id).await?;
    Ok((Profile::of(&followee, true), followee.id))
}

/// Stop following `username` and publish `UserUnfollowed`.
#[instrument(skip_all, fields(follower = %follower_id, username = %username))]
pub async fn unfollow(
    pool: &DbPool,
    bus: &dyn EventPublisher,
    follower_id: Uuid,
    username: String,
) -> DomainResult<Profile> {
    let (profile, followee_id) = transactional(pool, move |uow| {
        Box::pin(unfollow_in(uow, follower_id, username))
    })
    .await?;

    bus.publish_async(&UserUnfollowed {
        follower_id,
        followee_id,
    })
    .await;
    Ok(profile)
}

pub(crate) async fn unfollow_in<S>(
    store: &mut S,
    follower_id: Uuid,
    username: String,
) -> DomainResult<(Profile, Uuid)>
where
    S: UserStore + FollowerStore + ?Sized,
{
    let followee = user_by_username_required(store, &username).await?;
    store.delete_follow(follower_id, followee.id).await?;
    Ok((Profile::of(&followee, false), followee.id))
}
