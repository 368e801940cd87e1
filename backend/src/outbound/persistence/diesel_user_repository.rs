//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted back into validated domain values on read; a row that
//! no longer satisfies the domain rules surfaces as a query error rather than
//! leaking through.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageWindow;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    AvatarUrl, DisplayName, Email, PasswordHash, Role, StoredUser, User, UserId, UserPatch,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, affected, constraint_violation, map_basic_diesel_error,
    map_basic_pool_error, sql_count, sql_offset,
};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Map write failures, reporting unique violations against `email`.
fn map_write_error(error: diesel::result::Error, email: Option<&Email>) -> UserPersistenceError {
    match (constraint_violation(&error), email) {
        (Some(ConstraintViolation::Unique), Some(email)) => {
            UserPersistenceError::duplicate_email(email.as_ref())
        }
        _ => map_diesel_error(error),
    }
}

/// Convert a database row into a stored user.
fn row_to_stored_user(row: UserRow) -> Result<StoredUser, UserPersistenceError> {
    let UserRow {
        id,
        name,
        email,
        password_hash,
        avatar,
        role,
        created_at,
    } = row;
    let corrupt = |field: &'static str| {
        move |error: crate::domain::UserValidationError| {
            warn!(user_id = %id, field, %error, "stored user row failed validation");
            UserPersistenceError::query(format!("stored user has an invalid {field}"))
        }
    };
    let user = User::builder(
        UserId::from_uuid(id),
        DisplayName::new(name).map_err(corrupt("name"))?,
        Email::new(email).map_err(corrupt("email"))?,
    )
    .avatar(avatar.map(AvatarUrl::new).transpose().map_err(corrupt("avatar"))?)
    .role(role.parse::<Role>().map_err(corrupt("role"))?)
    .created_at(created_at)
    .build();
    Ok(StoredUser {
        user,
        password_hash: PasswordHash::new(password_hash),
    })
}

fn rows_to_stored_users(rows: Vec<UserRow>) -> Result<Vec<StoredUser>, UserPersistenceError> {
    rows.into_iter().map(row_to_stored_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: password_hash.as_str(),
            avatar: user.avatar().map(AsRef::as_ref),
            role: user.role().as_str(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_write_error(error, Some(user.email())))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_stored_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_stored_user).transpose()
    }

    async fn find_by_name(
        &self,
        name: &DisplayName,
    ) -> Result<Vec<StoredUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::name.eq(name.as_ref()))
            .select(UserRow::as_select())
            .order_by((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_stored_users(rows)
    }

    async fn find_page(
        &self,
        window: PageWindow,
    ) -> Result<(Vec<StoredUser>, u64), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut query = users::table
            .select(UserRow::as_select())
            .order_by((users::created_at.asc(), users::id.asc()))
            .offset(sql_offset(window.offset()))
            .into_boxed();
        if let Some(limit) = window.limit() {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<UserRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        Ok((rows_to_stored_users(rows)?, sql_count(total)))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserProfileUpdate {
            name: patch.name.as_ref().map(AsRef::as_ref),
            email: patch.email.as_ref().map(AsRef::as_ref),
        };

        diesel::update(users::table.find(id.as_uuid()))
            .set((changes, users::updated_at.eq(Utc::now())))
            .execute(&mut conn)
            .await
            .map(affected)
            .map_err(|error| map_write_error(error, patch.email.as_ref()))
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::role.eq(role.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn update_avatar(
        &self,
        id: &UserId,
        avatar: &AvatarUrl,
    ) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::avatar.eq(Some(avatar.as_ref())),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &UserId) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }
}
