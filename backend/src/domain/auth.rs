//! Authentication primitives: credentials, password material and tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{Email, Role, UserId, UserValidationError};

/// Minimum password length in bytes for new accounts.
pub const PASSWORD_MIN_BYTES: usize = 8;
/// Maximum password length in bytes (bcrypt ignores anything beyond 72).
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    InvalidEmail(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN_BYTES`].
    PasswordTooShort { min: usize },
    /// Password is longer than [`PASSWORD_MAX_BYTES`].
    PasswordTooLong { max: usize },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} bytes")
            }
            Self::PasswordTooLong { max } => write!(f, "password must be at most {max} bytes"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Plaintext password held in a buffer that is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Accept a password for a new account, enforcing the length policy.
    pub fn new(password: &str) -> Result<Self, LoginValidationError> {
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        if password.len() < PASSWORD_MIN_BYTES {
            return Err(LoginValidationError::PasswordTooShort {
                min: PASSWORD_MIN_BYTES,
            });
        }
        if password.len() > PASSWORD_MAX_BYTES {
            return Err(LoginValidationError::PasswordTooLong {
                max: PASSWORD_MAX_BYTES,
            });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Accept a password presented at login; only emptiness is checked so
    /// the policy is not leaked to callers guessing credentials.
    pub fn presented(password: &str) -> Result<Self, LoginValidationError> {
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Expose the plaintext for hashing or comparison.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(**redacted**)")
    }
}

/// One-way password hash as produced by the credential hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string suitable for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

/// Validated login credentials used by the user directory.
///
/// ## Invariants
/// - `email` is normalised the same way as stored addresses.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use recipe_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "password")
///     .expect("valid credentials");
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password().expose(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(LoginValidationError::InvalidEmail)?;
        let password = PlainPassword::presented(password)?;
        Ok(Self { email, password })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// Signed session token handed to clients after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Opaque bearer token.
    pub access_token: String,
    /// Token scheme for the `Authorization` header.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

impl SessionToken {
    /// Build a bearer token descriptor.
    pub fn bearer(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_owned(),
            expires_in,
        }
    }
}

/// Identity recovered from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Authenticated user.
    pub user_id: UserId,
    /// Email at the time the token was issued.
    pub email: Email,
    /// Role at the time the token was issued.
    pub role: Role,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::InvalidEmail(UserValidationError::EmptyEmail))]
    #[case("nobody", "pw", LoginValidationError::InvalidEmail(UserValidationError::InvalidEmail))]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_passwords_skip_length_policy() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "short")
            .expect("login accepts any non-empty password");
        assert_eq!(creds.password().expose(), "short");
    }

    #[rstest]
    #[case("short", LoginValidationError::PasswordTooShort { min: PASSWORD_MIN_BYTES })]
    #[case(&"x".repeat(PASSWORD_MAX_BYTES + 1), LoginValidationError::PasswordTooLong { max: PASSWORD_MAX_BYTES })]
    fn signup_passwords_enforce_length(
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(PlainPassword::new(password).expect_err("policy"), expected);
    }

    #[rstest]
    fn secrets_are_redacted_in_debug_output() {
        let password = PlainPassword::new("correct horse").expect("valid password");
        let hash = PasswordHash::new("$2b$04$abcdef");
        assert!(!format!("{password:?}").contains("horse"));
        assert!(!format!("{hash:?}").contains("abcdef"));
    }

    #[rstest]
    fn bearer_tokens_serialise_in_camel_case() {
        let token = SessionToken::bearer("abc", 3600);
        let value = serde_json::to_value(&token).expect("serialise token");
        assert_eq!(
            value,
            serde_json::json!({ "accessToken": "abc", "tokenType": "Bearer", "expiresIn": 3600 })
        );
    }
}
