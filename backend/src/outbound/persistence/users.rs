//! Diesel-backed implementations of the user and follower store ports.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FollowerStore, StoreError, UserStore};
use crate::domain::User;

use super::error_map::map_diesel_error;
use super::models::{NewFollowerRow, NewUserRow, UserChangesRow, UserRow};
use super::schema::{followers, users};
use super::unit_of_work::UnitOfWork;

#[async_trait]
impl UserStore for UnitOfWork {
    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), StoreError> {
        diesel::update(users::table.find(user.id))
            .set(UserChangesRow::from(user))
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn user_by_id(&mut self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(self.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(self.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(self.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_username_or_email(
        &mut self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username).or(users::email.eq(email)))
            .select(UserRow::as_select())
            .first(self.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn users_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(ids))
            .select(UserRow::as_select())
            .load(self.connection())
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(User::try_from).collect()
    }
}

#[async_trait]
impl FollowerStore for UnitOfWork {
    async fn insert_follow(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<(), StoreError> {
        diesel::insert_into(followers::table)
            .values(NewFollowerRow {
                follower_id,
                followee_id,
            })
            .on_conflict_do_nothing()
            .execute(self.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_follow(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<(), StoreError> {
        diesel::delete(
            followers::table.filter(
                followers::follower_id
                    .eq(follower_id)
                    .and(followers::followee_id.eq(followee_id)),
            ),
        )
        .execute(self.connection())
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn is_following(
        &mut self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<bool, StoreError> {
        diesel::select(diesel::dsl::exists(
            followers::table.filter(
                followers::follower_id
                    .eq(follower_id)
                    .and(followers::followee_id.eq(followee_id)),
            ),
        ))
        .get_result(self.connection())
        .await
        .map_err(map_diesel_error)
    }

    async fn following_ids(
        &mut self,
        follower_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, StoreError> {
        followers::table
            .filter(
                followers::follower_id
                    .eq(follower_id)
                    .and(followers::followee_id.eq_any(candidate_ids)),
            )
            .select(followers::followee_id)
            .load(self.connection())
            .await
            .map_err(map_diesel_error)
    }
}
