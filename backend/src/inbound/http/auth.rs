//! Bearer token authentication for HTTP handlers.
//!
//! Handlers that take an [`AuthenticatedUser`] argument reject requests
//! without a valid `Authorization: Bearer <token>` header with
//! `401 Unauthorized` before the handler body runs.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{Error, Role, TokenClaims, UserId};

use super::state::HttpState;

const BEARER_SCHEME: &str = "Bearer";

/// Identity of the caller, recovered from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(TokenClaims);

impl AuthenticatedUser {
    /// Wrap verified claims.
    pub fn new(claims: TokenClaims) -> Self {
        Self(claims)
    }

    /// Caller's user id.
    pub fn user_id(&self) -> &UserId {
        &self.0.user_id
    }

    /// Caller's role at the time the token was issued.
    pub fn role(&self) -> Role {
        self.0.role
    }

    /// Full verified claims.
    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

/// Extract the token from an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty()).then_some(token)
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("session token has expired"),
        TokenError::Invalid { message } => {
            debug!(%message, "rejected bearer token");
            Error::unauthorized("session token is invalid")
        }
        TokenError::Signing { message } => {
            Error::internal(format!("token verification failed: {message}"))
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("login required"))?
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let token =
        bearer_token(value).ok_or_else(|| Error::unauthorized("expected a bearer token"))?;
    state
        .tokens
        .verify(token)
        .map(AuthenticatedUser::new)
        .map_err(map_token_error)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
