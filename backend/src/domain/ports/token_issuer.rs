//! Port for signing and verifying session tokens.
use crate::domain::{SessionToken, TokenClaims, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token issuers.
    pub enum TokenError {
        /// The token's lifetime has elapsed.
        Expired => "token has expired",
        /// The token is malformed, wrongly signed, or names a bad subject.
        Invalid { message: String } => "token is invalid: {message}",
        /// The issuer could not sign a token.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues bearer tokens after login and verifies them on later requests.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `user`.
    fn issue(&self, user: &User) -> Result<SessionToken, TokenError>;

    /// Verify a presented token and recover its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
