//! User directory domain service.
//!
//! Implements the [`UserDirectory`] driving port on top of the user store,
//! the credential hasher, the token issuer and the image host. Stored records
//! carry a password hash; every value leaving this module has been converted
//! with [`StoredUser::into_public`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SubsecRound;
use mockable::Clock;
use pagination::{PageWindow, Paginated};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CredentialError, ImageUploadError, ImageUploader, PasswordHasher, TokenError, TokenIssuer,
    UserDirectory, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AffectedRows, AvatarPayload, AvatarUrl, DisplayName, Error, LoginCredentials, NewUser, Role,
    SessionToken, StoredUser, User, UserId, UserPatch,
};

/// Message returned when a user lookup finds nothing.
const USER_NOT_FOUND: &str = "user not found";

/// User directory service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserDirectoryService<R, H, T, U: ?Sized> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    uploader: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, H, T, U: ?Sized> UserDirectoryService<R, H, T, U> {
    /// Create a new service over the given adapters.
    pub fn new(
        users: Arc<R>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        uploader: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            uploader,
            clock,
        }
    }
}

impl<R, H, T, U> UserDirectoryService<R, H, T, U>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
    U: ImageUploader + ?Sized,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { email } => {
                Error::conflict("email address is already registered").with_details(json!({
                    "field": "email",
                    "value": email,
                    "code": "duplicate_email",
                }))
            }
        }
    }

    fn map_credential_error(error: CredentialError) -> Error {
        Error::internal(error.to_string())
    }

    fn map_token_error(error: TokenError) -> Error {
        Error::internal(format!("failed to issue session token: {error}"))
    }

    fn map_upload_error(error: ImageUploadError) -> Error {
        match error {
            ImageUploadError::Rejected { message } => {
                Error::invalid_request(format!("could not add an avatar: {message}"))
            }
            ImageUploadError::Transport { message } | ImageUploadError::Decode { message } => {
                Error::service_unavailable(format!("image host unavailable: {message}"))
            }
        }
    }

    fn not_found() -> Error {
        Error::not_found(USER_NOT_FOUND)
    }

    async fn fetch_stored(&self, id: &UserId) -> Result<StoredUser, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(Self::not_found)
    }
}

#[async_trait]
impl<R, H, T, U> UserDirectory for UserDirectoryService<R, H, T, U>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
    U: ImageUploader + ?Sized,
{
    async fn create(&self, candidate: NewUser) -> Result<User, Error> {
        let NewUser {
            name,
            email,
            password,
        } = candidate;
        let password_hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(Self::map_credential_error)?;
        // Stored timestamps have microsecond precision.
        let user = User::builder(UserId::random(), name, email)
            .created_at(self.clock.utc().trunc_subsecs(6))
            .build();
        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    async fn find_one(&self, id: &UserId) -> Result<User, Error> {
        self.fetch_stored(id).await.map(StoredUser::into_public)
    }

    async fn find_all(&self, window: PageWindow) -> Result<Paginated<User>, Error> {
        let (rows, total) = self
            .users
            .find_page(window)
            .await
            .map_err(Self::map_user_error)?;
        Ok(Paginated::new(rows, total, window).map(StoredUser::into_public))
    }

    async fn search(&self, name: &DisplayName) -> Result<Vec<User>, Error> {
        let rows = self
            .users
            .find_by_name(name)
            .await
            .map_err(Self::map_user_error)?;
        Ok(rows.into_iter().map(StoredUser::into_public).collect())
    }

    async fn update_one(&self, id: &UserId, patch: UserPatch) -> Result<AffectedRows, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request(
                "update must change at least one field",
            ));
        }
        let affected = self
            .users
            .update_profile(id, &patch)
            .await
            .map_err(Self::map_user_error)?;
        debug!(user_id = %id, affected, "user profile updated");
        Ok(AffectedRows::new(affected))
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<AffectedRows, Error> {
        let affected = self
            .users
            .update_role(id, role)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %id, %role, affected, "user role changed");
        Ok(AffectedRows::new(affected))
    }

    async fn delete_one(&self, id: &UserId) -> Result<AffectedRows, Error> {
        let affected = self
            .users
            .delete(id)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %id, affected, "user deleted");
        Ok(AffectedRows::new(affected))
    }

    async fn upload_avatar(&self, id: &UserId, payload: AvatarPayload) -> Result<User, Error> {
        let stored = self.fetch_stored(id).await?;

        let receipt = self
            .uploader
            .upload(&payload)
            .await
            .map_err(Self::map_upload_error)?;
        if receipt.created_at.is_none() {
            warn!(user_id = %id, "image host response lacked a creation timestamp");
            return Err(Error::invalid_request("could not add an avatar"));
        }
        let avatar = AvatarUrl::new(receipt.secure_url).map_err(|err| {
            Error::service_unavailable(format!("image host returned an unusable location: {err}"))
        })?;

        let affected = self
            .users
            .update_avatar(id, &avatar)
            .await
            .map_err(Self::map_user_error)?;
        if affected == 0 {
            return Err(Self::not_found());
        }
        info!(user_id = %id, "avatar updated");
        Ok(stored.into_public().with_avatar(avatar))
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<SessionToken, Error> {
        let user = self.validate(&credentials).await?;
        let token = self.tokens.issue(&user).map_err(Self::map_token_error)?;
        info!(user_id = %user.id(), "session token issued");
        Ok(token)
    }

    async fn validate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(Self::not_found)?;
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(Self::map_credential_error)?;
        if !matches {
            debug!(user_id = %stored.user.id(), "password mismatch");
            return Err(Error::invalid_request("password is not correct"));
        }
        Ok(stored.into_public())
    }
}

#[cfg(test)]
#[path = "user_directory_tests.rs"]
mod tests;
