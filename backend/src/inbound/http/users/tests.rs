//! Tests for users API handlers.

use super::*;
use crate::domain::ports::{MockRecipeDirectory, MockTokenIssuer, MockUserDirectory};
use crate::domain::{AffectedRows, Error, SessionToken, UserId};
use crate::inbound::http::test_utils::{
    bearer, claims_for, sample_user, test_app, test_state, tokens_for,
};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use pagination::Paginated;
use rstest::rstest;
use serde_json::{Value, json};

const CALLER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const OTHER: &str = "9b2d8f0e-1c4a-4e7b-8d3f-5a6b7c8d9e0f";

fn caller_id() -> UserId {
    UserId::new(CALLER).expect("fixture id")
}

fn other_id() -> UserId {
    UserId::new(OTHER).expect("fixture id")
}

async fn send(
    users: MockUserDirectory,
    tokens: MockTokenIssuer,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let state = test_state(users, MockRecipeDirectory::new(), tokens);
    let app = actix_test::init_service(test_app(state, configure)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

fn signed_in_as(role: Role) -> MockTokenIssuer {
    tokens_for(claims_for(&caller_id(), role))
}

#[actix_web::test]
async fn signup_returns_created_user() {
    let mut users = MockUserDirectory::new();
    users
        .expect_create()
        .withf(|candidate: &NewUser| {
            candidate.name.as_ref() == "Ada Lovelace"
                && candidate.email.as_ref() == "ada@example.com"
                && candidate.password.expose() == "correct horse"
        })
        .times(1)
        .return_once(|_| Ok(sample_user(&caller_id(), "Ada Lovelace")));

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": "ADA@example.com",
            "password": "correct horse",
        }));
    let (status, body) = send(users, MockTokenIssuer::new(), request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("id"), Some(&json!(CALLER)));
    assert_eq!(body.get("role"), Some(&json!("user")));
    assert!(body.get("password").is_none());
}

#[rstest]
#[case::bad_email(json!({"name": "Ada Lovelace", "email": "nope", "password": "correct horse"}), "email")]
#[case::short_name(json!({"name": "A", "email": "ada@example.com", "password": "correct horse"}), "name")]
#[case::short_password(json!({"name": "Ada Lovelace", "email": "ada@example.com", "password": "short"}), "password")]
#[case::missing_password(json!({"name": "Ada Lovelace", "email": "ada@example.com"}), "body")]
#[actix_web::test]
async fn signup_rejects_invalid_input(#[case] payload: Value, #[case] field: &str) {
    let mut users = MockUserDirectory::new();
    users.expect_create().times(0);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(payload);
    let (status, body) = send(users, MockTokenIssuer::new(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("code"), Some(&json!("invalid_request")));
    assert_eq!(body.pointer("/details/field"), Some(&json!(field)));
}

#[actix_web::test]
async fn signup_conflict_is_409() {
    let mut users = MockUserDirectory::new();
    users
        .expect_create()
        .times(1)
        .return_once(|_| Err(Error::conflict("email address is already registered")));

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "correct horse",
        }));
    let (status, _) = send(users, MockTokenIssuer::new(), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_returns_bearer_token() {
    let mut users = MockUserDirectory::new();
    users
        .expect_login()
        .withf(|credentials: &LoginCredentials| {
            credentials.email().as_ref() == "ada@example.com"
                && credentials.password().expose() == "pw"
        })
        .times(1)
        .return_once(|_| Ok(SessionToken::bearer("signed", 3600)));

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"email": "ada@example.com", "password": "pw"}));
    let (status, body) = send(users, MockTokenIssuer::new(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"accessToken": "signed", "tokenType": "Bearer", "expiresIn": 3600})
    );
}

#[rstest]
#[case::unknown_email(Error::not_found("user not found"), StatusCode::NOT_FOUND)]
#[case::wrong_password(Error::invalid_request("password is not correct"), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn login_failures_map_to_status(#[case] failure: Error, #[case] expected: StatusCode) {
    let mut users = MockUserDirectory::new();
    users
        .expect_login()
        .times(1)
        .return_once(move |_| Err(failure));

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"email": "ada@example.com", "password": "pw"}));
    let (status, _) = send(users, MockTokenIssuer::new(), request).await;
    assert_eq!(status, expected);
}

#[actix_web::test]
async fn listing_requires_a_token() {
    let mut users = MockUserDirectory::new();
    users.expect_find_all().times(0);

    let request = actix_test::TestRequest::get().uri("/api/v1/users");
    let (status, body) = send(users, MockTokenIssuer::new(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
}

#[actix_web::test]
async fn listing_passes_limit_and_offset() {
    let mut users = MockUserDirectory::new();
    users
        .expect_find_all()
        .withf(|window: &PageWindow| window.limit() == Some(2) && window.offset() == 4)
        .times(1)
        .return_once(|window| {
            Ok(Paginated::new(
                vec![sample_user(&other_id(), "Grace Hopper")],
                5,
                window,
            ))
        });
    users.expect_search().times(0);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users?limit=2&offset=4")
        .insert_header(bearer());
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("totalItems"), Some(&json!(5)));
    assert_eq!(body.get("itemCount"), Some(&json!(2)));
    assert_eq!(body.get("currentPage"), Some(&json!(4)));
    assert_eq!(body.get("itemsPerPage"), Some(&json!(1)));
}

#[actix_web::test]
async fn listing_by_name_searches() {
    let mut users = MockUserDirectory::new();
    users
        .expect_search()
        .withf(|name: &DisplayName| name.as_ref() == "Grace Hopper")
        .times(1)
        .return_once(|_| Ok(vec![sample_user(&other_id(), "Grace Hopper")]));
    users.expect_find_all().times(0);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users?name=Grace%20Hopper")
        .insert_header(bearer());
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array of users");
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|item| item.get("password").is_none()));
}

#[actix_web::test]
async fn oversized_limit_is_rejected() {
    let mut users = MockUserDirectory::new();
    users.expect_find_all().times(0);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users?limit=500")
        .insert_header(bearer());
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("details"),
        Some(&json!({"field": "limit", "value": "500", "code": "out_of_range"}))
    );
}

#[actix_web::test]
async fn fetching_with_a_malformed_id_is_rejected() {
    let mut users = MockUserDirectory::new();
    users.expect_find_one().times(0);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/not-a-uuid")
        .insert_header(bearer());
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/code"), Some(&json!("invalid_uuid")));
}

#[actix_web::test]
async fn fetching_an_unknown_user_is_404() {
    let mut users = MockUserDirectory::new();
    users
        .expect_find_one()
        .withf(|id: &UserId| id == &other_id())
        .times(1)
        .return_once(|_| Err(Error::not_found("user not found")));

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{OTHER}"))
        .insert_header(bearer());
    let (status, _) = send(users, signed_in_as(Role::User), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn owners_update_their_profile() {
    let mut users = MockUserDirectory::new();
    users
        .expect_update_one()
        .withf(|id: &UserId, patch: &UserPatch| {
            id == &caller_id()
                && patch.name.as_ref().map(AsRef::as_ref) == Some("Ada King")
                && patch.email.is_none()
        })
        .times(1)
        .return_once(|_, _| Ok(AffectedRows::new(1)));

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{CALLER}"))
        .insert_header(bearer())
        .set_json(json!({"name": "Ada King"}));
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"affected": 1}));
}

#[rstest]
#[case::plain_user(Role::User)]
#[case::admin(Role::Admin)]
#[actix_web::test]
async fn nobody_updates_someone_elses_profile(#[case] role: Role) {
    let mut users = MockUserDirectory::new();
    users.expect_update_one().times(0);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{OTHER}"))
        .insert_header(bearer())
        .set_json(json!({"name": "Mallory"}));
    let (status, body) = send(users, signed_in_as(role), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body.get("code"), Some(&json!("forbidden")));
}

#[rstest]
#[case::admin(Role::Admin, StatusCode::OK, 1)]
#[case::chief_editor(Role::ChiefEditor, StatusCode::FORBIDDEN, 0)]
#[case::user(Role::User, StatusCode::FORBIDDEN, 0)]
#[actix_web::test]
async fn only_admins_change_roles(
    #[case] role: Role,
    #[case] expected: StatusCode,
    #[case] calls: usize,
) {
    let mut users = MockUserDirectory::new();
    users
        .expect_update_role()
        .withf(|id: &UserId, role: &Role| id == &other_id() && *role == Role::Editor)
        .times(calls)
        .returning(|_, _| Ok(AffectedRows::new(1)));

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{OTHER}/role"))
        .insert_header(bearer())
        .set_json(json!({"role": "editor"}));
    let (status, _) = send(users, signed_in_as(role), request).await;
    assert_eq!(status, expected);
}

#[rstest]
#[case::unknown(json!({"role": "root"}), "role")]
#[case::missing(json!({}), "role")]
#[actix_web::test]
async fn role_changes_need_a_known_role(#[case] payload: Value, #[case] field: &str) {
    let mut users = MockUserDirectory::new();
    users.expect_update_role().times(0);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{OTHER}/role"))
        .insert_header(bearer())
        .set_json(payload);
    let (status, body) = send(users, signed_in_as(Role::Admin), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/field"), Some(&json!(field)));
}

#[rstest]
#[case::owner(CALLER, Role::User, StatusCode::OK, 1)]
#[case::admin(OTHER, Role::Admin, StatusCode::OK, 1)]
#[case::stranger(OTHER, Role::Editor, StatusCode::FORBIDDEN, 0)]
#[actix_web::test]
async fn deletion_is_limited_to_owner_or_admin(
    #[case] target: &str,
    #[case] role: Role,
    #[case] expected: StatusCode,
    #[case] calls: usize,
) {
    let mut users = MockUserDirectory::new();
    users
        .expect_delete_one()
        .times(calls)
        .returning(|_| Ok(AffectedRows::new(1)));

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{target}"))
        .insert_header(bearer());
    let (status, _) = send(users, signed_in_as(role), request).await;
    assert_eq!(status, expected);
}

#[actix_web::test]
async fn avatar_upload_returns_updated_user() {
    let mut users = MockUserDirectory::new();
    users
        .expect_upload_avatar()
        .withf(|id: &UserId, image: &AvatarPayload| {
            id == &caller_id()
                && image.as_upload_source() == "https://images.example.com/ada.png"
        })
        .times(1)
        .return_once(|_, _| {
            let avatar = crate::domain::AvatarUrl::new("https://cdn.example.com/ada.png")
                .expect("fixture avatar");
            Ok(sample_user(&caller_id(), "Ada Lovelace").with_avatar(avatar))
        });

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/users/{CALLER}/avatar"))
        .insert_header(bearer())
        .set_json(json!({"image": "https://images.example.com/ada.png"}));
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("avatar"), Some(&json!("https://cdn.example.com/ada.png")));
}

#[rstest]
#[case::missing(json!({}), StatusCode::BAD_REQUEST)]
#[case::not_an_image(json!({"image": "ftp://example.com/x.png"}), StatusCode::BAD_REQUEST)]
#[case::bad_base64(json!({"image": "data:image/png;base64,@@@"}), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn avatar_upload_validates_the_image(#[case] payload: Value, #[case] expected: StatusCode) {
    let mut users = MockUserDirectory::new();
    users.expect_upload_avatar().times(0);

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/users/{CALLER}/avatar"))
        .insert_header(bearer())
        .set_json(payload);
    let (status, body) = send(users, signed_in_as(Role::User), request).await;

    assert_eq!(status, expected);
    assert_eq!(body.pointer("/details/field"), Some(&json!("image")));
}

#[actix_web::test]
async fn avatar_upload_for_someone_else_is_forbidden() {
    let mut users = MockUserDirectory::new();
    users.expect_upload_avatar().times(0);

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/users/{OTHER}/avatar"))
        .insert_header(bearer())
        .set_json(json!({"image": "https://images.example.com/ada.png"}));
    let (status, _) = send(users, signed_in_as(Role::Admin), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
