//! HS256 JSON Web Token implementation of the `TokenIssuer` port.
//!
//! Tokens carry the user id as `sub` alongside the email and role at issue
//! time. Verification allows a small clock skew.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{Email, Role, SessionToken, TokenClaims, User, UserId};

const ISSUER: &str = "recipe-backend";
const LEEWAY_SECS: u64 = 60;
const GENERATED_SECRET_BYTES: usize = 32;

/// Settings for [`JwtTokenIssuer`].
#[derive(Clone)]
pub struct JwtConfig {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl JwtConfig {
    /// Sign with `secret`; tokens live for `ttl`.
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_ref().to_vec()),
            ttl,
        }
    }

    /// Sign with a freshly generated secret.
    ///
    /// Tokens issued this way do not survive a restart.
    pub fn with_random_secret(ttl: Duration) -> Self {
        let mut secret = Zeroizing::new(vec![0_u8; GENERATED_SECRET_BYTES]);
        rand::thread_rng().fill_bytes(secret.as_mut_slice());
        warn!("no token secret configured; generated an ephemeral one");
        Self { secret, ttl }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"**redacted**")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    email: String,
    role: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    /// Build an issuer from its configuration and a time source.
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            ttl: config.ttl,
            clock,
        }
    }
}

fn invalid(message: impl Into<String>) -> TokenError {
    TokenError::invalid(message)
}

fn into_claims(wire: WireClaims) -> Result<TokenClaims, TokenError> {
    let user_id = UserId::new(&wire.sub).map_err(|err| invalid(format!("sub: {err}")))?;
    let email = Email::new(&wire.email).map_err(|err| invalid(format!("email: {err}")))?;
    let role = wire
        .role
        .parse::<Role>()
        .map_err(|err| invalid(format!("role: {err}")))?;
    let expires_at = DateTime::<Utc>::from_timestamp(wire.exp, 0)
        .ok_or_else(|| invalid("exp is out of range"))?;
    Ok(TokenClaims {
        user_id,
        email,
        role,
        expires_at,
    })
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<SessionToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let wire = WireClaims {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_owned(),
            iss: ISSUER.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        let expires_in = u64::try_from(self.ttl.num_seconds()).unwrap_or(0);
        Ok(SessionToken::bearer(token, expires_in))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<WireClaims>(token, &self.decoding, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                other => invalid(format!("{other:?}")),
            },
        )?;
        into_claims(data.claims)
    }
}
