//! Shared HTTP helpers for the end-to-end API suites.
//!
//! Each suite drives the real routing, extractors and directory services
//! over the in-memory adapters from the `test-support` feature.

#![allow(dead_code, reason = "each suite uses a subset of the helpers")]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use recipe_backend::Trace;
use recipe_backend::domain::Role;
use recipe_backend::domain::ports::UserRepository;
use recipe_backend::domain::UserId;
use recipe_backend::inbound::http::configure_api;
use recipe_backend::test_support::TestBackend;
use serde_json::{Value, json};

/// Fresh in-memory backend.
pub fn backend() -> TestBackend {
    TestBackend::new()
}

/// Initialise the API the way the server mounts it.
pub async fn init_api(
    backend: &TestBackend,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(backend.state.clone()))
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await
}

/// Signed-in account used by the suites.
pub struct Account {
    pub id: String,
    pub token: String,
}

impl Account {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

/// Status and decoded JSON body of a response.
pub async fn read(response: ServiceResponse) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

/// Send a JSON request, optionally authenticated.
pub async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
    account: Option<&Account>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = request;
    if let Some(account) = account {
        request = request.insert_header(account.bearer());
    }
    if let Some(body) = body {
        request = request.set_json(body);
    }
    read(actix_test::call_service(app, request.to_request()).await).await
}

/// Register an account and log it in.
pub async fn sign_up(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    email: &str,
) -> Account {
    let (status, user) = send(
        app,
        actix_test::TestRequest::post().uri("/api/v1/users"),
        None,
        Some(json!({ "name": name, "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {user}");
    let id = user["id"].as_str().expect("user id").to_owned();
    let token = log_in(app, email).await;
    Account { id, token }
}

/// Log in with the suite password and return the access token.
pub async fn log_in(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> String {
    let (status, token) = send(
        app,
        actix_test::TestRequest::post().uri("/api/v1/users/login"),
        None,
        Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {token}");
    token["accessToken"]
        .as_str()
        .expect("access token")
        .to_owned()
}

/// Grant `role` directly in the store; the caller must log in again for the
/// new role to appear in their token.
pub async fn grant_role(backend: &TestBackend, account: &Account, role: Role) {
    let id = UserId::new(&account.id).expect("valid id");
    let affected = backend
        .store
        .update_role(&id, role)
        .await
        .expect("role update");
    assert_eq!(affected, 1);
}
