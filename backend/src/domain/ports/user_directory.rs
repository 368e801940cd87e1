//! Driving port for user account use-cases.
//!
//! Inbound adapters call this port for every `/users` operation. Every `User`
//! it returns has already had its password hash removed.

use async_trait::async_trait;
use pagination::{PageWindow, Paginated};

use crate::domain::{
    AffectedRows, AvatarPayload, DisplayName, Error, LoginCredentials, NewUser, Role,
    SessionToken, User, UserId, UserPatch,
};

/// Domain use-case port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Register a new account.
    async fn create(&self, candidate: NewUser) -> Result<User, Error>;

    /// Fetch one account.
    async fn find_one(&self, id: &UserId) -> Result<User, Error>;

    /// Fetch a page of accounts.
    async fn find_all(&self, window: PageWindow) -> Result<Paginated<User>, Error>;

    /// Fetch accounts whose display name matches exactly.
    async fn search(&self, name: &DisplayName) -> Result<Vec<User>, Error>;

    /// Apply a profile patch.
    async fn update_one(&self, id: &UserId, patch: UserPatch) -> Result<AffectedRows, Error>;

    /// Replace an account's role.
    async fn update_role(&self, id: &UserId, role: Role) -> Result<AffectedRows, Error>;

    /// Remove an account.
    async fn delete_one(&self, id: &UserId) -> Result<AffectedRows, Error>;

    /// Upload a new avatar and record its location.
    async fn upload_avatar(&self, id: &UserId, payload: AvatarPayload) -> Result<User, Error>;

    /// Check credentials and issue a session token.
    async fn login(&self, credentials: LoginCredentials) -> Result<SessionToken, Error>;

    /// Check credentials and return the matching account.
    async fn validate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
