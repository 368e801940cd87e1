//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::{
    AvatarUrl, DisplayName, Email, PasswordHash, Role, StoredUser, User, UserId, UserPatch,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email address already registered: {email}",
    }
}

/// Driven port over the user store.
///
/// Mutations report affected row counts rather than failing when the target
/// row is absent; callers decide whether zero is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user together with its password hash.
    async fn insert(&self, user: &User, password_hash: &PasswordHash)
    -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, UserPersistenceError>;

    /// Fetch a user by normalised email address.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<StoredUser>, UserPersistenceError>;

    /// Fetch every user with exactly this display name, oldest first.
    async fn find_by_name(&self, name: &DisplayName)
    -> Result<Vec<StoredUser>, UserPersistenceError>;

    /// Fetch one page of users ordered by creation time, with the total count.
    async fn find_page(
        &self,
        window: PageWindow,
    ) -> Result<(Vec<StoredUser>, u64), UserPersistenceError>;

    /// Apply a profile patch.
    async fn update_profile(&self, id: &UserId, patch: &UserPatch)
    -> Result<u64, UserPersistenceError>;

    /// Replace the user's role.
    async fn update_role(&self, id: &UserId, role: Role) -> Result<u64, UserPersistenceError>;

    /// Replace the user's avatar location.
    async fn update_avatar(&self, id: &UserId, avatar: &AvatarUrl)
    -> Result<u64, UserPersistenceError>;

    /// Remove the user and, through the store's cascade, their recipes.
    async fn delete(&self, id: &UserId) -> Result<u64, UserPersistenceError>;
}
