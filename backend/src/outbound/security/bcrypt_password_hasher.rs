//! bcrypt-backed `PasswordHasher`.
//!
//! bcrypt is CPU bound, so both hashing and verification run on the blocking
//! thread pool to keep request workers responsive.

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialError, PasswordHasher};
use crate::domain::{PasswordHash, PlainPassword};

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Password hasher using bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher with the given work factor.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hashing`] when `cost` is outside
    /// `4..=31`.
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if (MIN_COST..=MAX_COST).contains(&cost) {
            Ok(Self { cost })
        } else {
            Err(CredentialError::hashing(format!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            )))
        }
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, CredentialError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| CredentialError::hashing(format!("bcrypt task failed: {err}")))?
        .map_err(|err| CredentialError::hashing(err.to_string()))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialError> {
        let secret = Zeroizing::new(password.expose().to_owned());
        let cost = self.cost;
        let encoded = run_blocking(move || bcrypt::hash(secret.as_bytes(), cost)).await?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        let secret = Zeroizing::new(password.expose().to_owned());
        let encoded = hash.as_str().to_owned();
        let matches = run_blocking(move || bcrypt::verify(secret.as_bytes(), &encoded)).await?;
        debug!(matches, "password verification finished");
        Ok(matches)
    }
}
