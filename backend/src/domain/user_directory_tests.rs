//! Tests for the user directory service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockImageUploader, MockPasswordHasher, MockTokenIssuer, MockUserRepository, UploadReceipt,
};
use crate::domain::{Email, ErrorCode, PasswordHash, PlainPassword};

type Service =
    UserDirectoryService<MockUserRepository, MockPasswordHasher, MockTokenIssuer, MockImageUploader>;

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
            .single()
            .expect("valid fixture timestamp")
    }
}

#[derive(Default)]
struct Mocks {
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenIssuer,
    uploader: MockImageUploader,
}

impl Mocks {
    fn into_service(self) -> Service {
        UserDirectoryService::new(
            Arc::new(self.users),
            Arc::new(self.hasher),
            Arc::new(self.tokens),
            Arc::new(self.uploader),
            Arc::new(FixtureClock),
        )
    }
}

fn stored_user() -> StoredUser {
    let user = User::builder(
        UserId::random(),
        DisplayName::new("Ada Lovelace").expect("fixture name"),
        Email::new("ada@example.com").expect("fixture email"),
    )
    .build();
    StoredUser {
        user,
        password_hash: PasswordHash::new("stored-hash"),
    }
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("ada@example.com", password).expect("fixture credentials")
}

fn receipt(created_at: Option<DateTime<Utc>>) -> UploadReceipt {
    UploadReceipt {
        secure_url: "https://res.example.com/avatars/ada.png".to_owned(),
        created_at,
    }
}

#[tokio::test]
async fn create_hashes_password_and_returns_public_user() {
    let mut mocks = Mocks::default();
    mocks
        .hasher
        .expect_hash()
        .withf(|password: &PlainPassword| password.expose() == "correct horse")
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("hashed")));
    mocks
        .users
        .expect_insert()
        .withf(|user: &User, hash: &PasswordHash| {
            user.email().as_ref() == "ada@example.com"
                && user.role() == Role::User
                && hash.as_str() == "hashed"
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let candidate = NewUser {
        name: DisplayName::new("Ada Lovelace").expect("name"),
        email: Email::new("ada@example.com").expect("email"),
        password: PlainPassword::new("correct horse").expect("password"),
    };
    let user = mocks
        .into_service()
        .create(candidate)
        .await
        .expect("user created");

    assert_eq!(user.name().as_ref(), "Ada Lovelace");
    assert_eq!(user.created_at(), FixtureClock.utc());
}

#[tokio::test]
async fn create_maps_duplicate_email_to_conflict() {
    let mut mocks = Mocks::default();
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));
    mocks
        .users
        .expect_insert()
        .return_once(|_, _| Err(UserPersistenceError::duplicate_email("ada@example.com")));

    let candidate = NewUser {
        name: DisplayName::new("Ada Lovelace").expect("name"),
        email: Email::new("ada@example.com").expect("email"),
        password: PlainPassword::new("correct horse").expect("password"),
    };
    let error = mocks
        .into_service()
        .create(candidate)
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d.get("field")),
        Some(&json!("email"))
    );
}

#[rstest]
#[case::connection(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn find_one_maps_repository_failures(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Err(failure));

    let error = mocks
        .into_service()
        .find_one(&UserId::random())
        .await
        .expect_err("failure");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn find_one_reports_missing_user() {
    let mut mocks = Mocks::default();
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));

    let error = mocks
        .into_service()
        .find_one(&UserId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn find_all_wraps_rows_in_page_envelope() {
    let mut mocks = Mocks::default();
    let rows = vec![stored_user(), stored_user()];
    mocks
        .users
        .expect_find_page()
        .times(1)
        .return_once(move |_| Ok((rows, 2)));

    let page = mocks
        .into_service()
        .find_all(PageWindow::unbounded())
        .await
        .expect("page");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_items, 2);
    assert_eq!(page.items_per_page, 2);
}

#[tokio::test]
async fn search_returns_public_users() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    let expected = row.user.clone();
    mocks
        .users
        .expect_find_by_name()
        .withf(|name: &DisplayName| name.as_ref() == "Ada Lovelace")
        .return_once(move |_| Ok(vec![row]));

    let users = mocks
        .into_service()
        .search(&DisplayName::new("Ada Lovelace").expect("name"))
        .await
        .expect("search");
    assert_eq!(users, vec![expected]);
    let value = serde_json::to_value(&users).expect("serialise");
    assert!(!value.to_string().contains("stored-hash"));
}

#[tokio::test]
async fn update_one_rejects_empty_patch_without_touching_store() {
    let mut mocks = Mocks::default();
    mocks.users.expect_update_profile().times(0);

    let error = mocks
        .into_service()
        .update_one(&UserId::random(), UserPatch::default())
        .await
        .expect_err("empty patch");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn update_one_reports_zero_rows_for_unknown_user() {
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_update_profile()
        .return_once(|_, _| Ok(0));

    let patch = UserPatch {
        name: Some(DisplayName::new("Grace Hopper").expect("name")),
        email: None,
    };
    let outcome = mocks
        .into_service()
        .update_one(&UserId::random(), patch)
        .await
        .expect("update");
    assert_eq!(outcome, AffectedRows::new(0));
}

#[tokio::test]
async fn update_role_and_delete_report_affected_rows() {
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_update_role()
        .withf(|_, role: &Role| *role == Role::Editor)
        .return_once(|_, _| Ok(1));
    mocks.users.expect_delete().return_once(|_| Ok(1));

    let service = mocks.into_service();
    let id = UserId::random();
    assert_eq!(
        service.update_role(&id, Role::Editor).await.expect("role"),
        AffectedRows::new(1)
    );
    assert_eq!(
        service.delete_one(&id).await.expect("delete"),
        AffectedRows::new(1)
    );
}

#[tokio::test]
async fn validate_rejects_unknown_email_before_hashing() {
    let mut mocks = Mocks::default();
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    mocks.hasher.expect_verify().times(0);

    let error = mocks
        .into_service()
        .validate(&credentials("whatever"))
        .await
        .expect_err("unknown email");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn validate_rejects_wrong_password() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(row)));
    mocks
        .hasher
        .expect_verify()
        .withf(|_, hash: &PasswordHash| hash.as_str() == "stored-hash")
        .return_once(|_, _| Ok(false));

    let error = mocks
        .into_service()
        .validate(&credentials("wrong"))
        .await
        .expect_err("mismatch");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "password is not correct");
}

#[tokio::test]
async fn login_issues_token_for_valid_credentials() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    let user_id = row.user.id().clone();
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(row)));
    mocks.hasher.expect_verify().return_once(|_, _| Ok(true));
    mocks
        .tokens
        .expect_issue()
        .withf(move |user: &User| user.id() == &user_id)
        .times(1)
        .return_once(|_| Ok(SessionToken::bearer("signed", 3600)));

    let token = mocks
        .into_service()
        .login(credentials("correct horse"))
        .await
        .expect("token");
    assert_eq!(token.access_token, "signed");
    assert_eq!(token.token_type, "Bearer");
}

#[tokio::test]
async fn login_hides_signing_failures_as_internal_errors() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(row)));
    mocks.hasher.expect_verify().return_once(|_, _| Ok(true));
    mocks
        .tokens
        .expect_issue()
        .return_once(|_| Err(TokenError::signing("bad key")));

    let error = mocks
        .into_service()
        .login(credentials("correct horse"))
        .await
        .expect_err("signing failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn upload_avatar_requires_existing_user_before_uploading() {
    let mut mocks = Mocks::default();
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    mocks.uploader.expect_upload().times(0);

    let payload = AvatarPayload::parse("https://images.example.com/a.png").expect("payload");
    let error = mocks
        .into_service()
        .upload_avatar(&UserId::random(), payload)
        .await
        .expect_err("missing user");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn upload_avatar_without_timestamp_leaves_store_untouched() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(row)));
    mocks
        .uploader
        .expect_upload()
        .return_once(|_| Ok(receipt(None)));
    mocks.users.expect_update_avatar().times(0);

    let payload = AvatarPayload::parse("https://images.example.com/a.png").expect("payload");
    let error = mocks
        .into_service()
        .upload_avatar(&UserId::random(), payload)
        .await
        .expect_err("incomplete receipt");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "could not add an avatar");
}

#[tokio::test]
async fn upload_avatar_merges_new_location() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    let id = row.user.id().clone();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(row)));
    mocks
        .uploader
        .expect_upload()
        .return_once(|_| Ok(receipt(Some(Utc::now()))));
    mocks
        .users
        .expect_update_avatar()
        .withf(|_, avatar: &AvatarUrl| avatar.as_ref() == "https://res.example.com/avatars/ada.png")
        .times(1)
        .return_once(|_, _| Ok(1));

    let payload = AvatarPayload::parse("https://images.example.com/a.png").expect("payload");
    let user = mocks
        .into_service()
        .upload_avatar(&id, payload)
        .await
        .expect("avatar uploaded");
    assert_eq!(
        user.avatar().map(AsRef::as_ref),
        Some("https://res.example.com/avatars/ada.png")
    );
}

#[tokio::test]
async fn upload_avatar_reports_user_deleted_mid_flight() {
    let mut mocks = Mocks::default();
    let row = stored_user();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(row)));
    mocks
        .uploader
        .expect_upload()
        .return_once(|_| Ok(receipt(Some(Utc::now()))));
    mocks
        .users
        .expect_update_avatar()
        .return_once(|_, _| Ok(0));

    let payload = AvatarPayload::parse("https://images.example.com/a.png").expect("payload");
    let error = mocks
        .into_service()
        .upload_avatar(&UserId::random(), payload)
        .await
        .expect_err("vanished");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::transport(ImageUploadError::transport("timeout"), ErrorCode::ServiceUnavailable)]
#[case::decode(ImageUploadError::decode("not json"), ErrorCode::ServiceUnavailable)]
#[case::rejected(ImageUploadError::rejected("Invalid image file"), ErrorCode::InvalidRequest)]
#[tokio::test]
async fn upload_avatar_maps_host_failures(
    #[case] failure: ImageUploadError,
    #[case] expected: ErrorCode,
) {
    let mut mocks = Mocks::default();
    let row = stored_user();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(row)));
    mocks
        .uploader
        .expect_upload()
        .return_once(move |_| Err(failure));
    mocks.users.expect_update_avatar().times(0);

    let payload = AvatarPayload::parse("https://images.example.com/a.png").expect("payload");
    let error = mocks
        .into_service()
        .upload_avatar(&UserId::random(), payload)
        .await
        .expect_err("host failure");
    assert_eq!(error.code(), expected);
}
