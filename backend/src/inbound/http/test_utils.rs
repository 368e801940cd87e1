//! Test helpers for inbound HTTP components.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, web};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

use crate::domain::ports::{MockRecipeDirectory, MockTokenIssuer, MockUserDirectory};
use crate::domain::{DisplayName, Email, Role, TokenClaims, User, UserId};

use super::error::{json_config, path_config, query_config};
use super::state::HttpState;

/// Token accepted by [`tokens_for`].
pub const ACCESS_TOKEN: &str = "test-access-token";

/// `Authorization` header carrying [`ACCESS_TOKEN`].
pub fn bearer() -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {ACCESS_TOKEN}"))
}

/// Claims for a caller with the given id and role.
pub fn claims_for(user_id: &UserId, role: Role) -> TokenClaims {
    TokenClaims {
        user_id: user_id.clone(),
        email: Email::new("caller@example.com").expect("fixture email"),
        role,
        expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).single().expect("instant"),
    }
}

/// Token issuer that verifies [`ACCESS_TOKEN`] as the given claims.
pub fn tokens_for(claims: TokenClaims) -> MockTokenIssuer {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .withf(|token: &str| token == ACCESS_TOKEN)
        .returning(move |_| Ok(claims.clone()));
    tokens
}

/// Public user fixture.
pub fn sample_user(id: &UserId, name: &str) -> User {
    let local_part = name.to_lowercase().replace(' ', ".");
    User::builder(
        id.clone(),
        DisplayName::new(name).expect("fixture name"),
        Email::new(format!("{local_part}@example.com")).expect("fixture email"),
    )
    .created_at(Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).single().expect("instant"))
    .build()
}

/// Assemble handler state from mocks.
pub fn test_state(
    users: MockUserDirectory,
    recipes: MockRecipeDirectory,
    tokens: MockTokenIssuer,
) -> HttpState {
    HttpState::new(Arc::new(users), Arc::new(recipes), Arc::new(tokens))
}

/// App mounting `configure` under `/api/v1` with the production extractor
/// configuration.
pub fn test_app(
    state: HttpState,
    configure: fn(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(web::scope("/api/v1").configure(configure))
}
