//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON shape of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are only used for OpenAPI generation via utoipa"
)]

use std::borrow::Cow;

use utoipa::openapi::schema::{OneOfBuilder, Ref, Schema};
use utoipa::openapi::RefOr;
use utoipa::{PartialSchema, ToSchema};

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with stored state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The store or the image host is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "email must be a valid address")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "6f1c2b8e-7f3d-4b1a-9a55-0d3c6e1f2a4b")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    #[schema(rename = "admin")]
    Admin,
    #[schema(rename = "chief_editor")]
    ChiefEditor,
    #[schema(rename = "editor")]
    Editor,
    #[schema(rename = "user")]
    User,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// Public account representation; never contains password material.
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    name: String,
    /// Unique, lowercased email address.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Avatar location, omitted until one is uploaded.
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/ada.png")]
    avatar: Option<String>,
    /// Authorisation role.
    role: RoleSchema,
    /// Account creation time.
    created_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for a page of users.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserPageSchema {
    items: Vec<UserSchema>,
    total_items: u64,
    /// Requested limit, or the number of items returned when unbounded.
    item_count: u64,
    /// Offset echoed back for user listings.
    current_page: u64,
    /// `min(limit or total, total - offset)`.
    items_per_page: u64,
}

/// OpenAPI schema for [`crate::domain::Recipe`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Recipe, rename_all = "camelCase")]
pub struct RecipeSchema {
    /// Stable recipe identifier.
    id: uuid::Uuid,
    /// Author.
    user_id: uuid::Uuid,
    #[schema(example = "Shakshuka")]
    title: String,
    description: Option<String>,
    #[schema(example = json!(["6 eggs", "1 tin tomatoes"]))]
    ingredients: Vec<String>,
    instructions: String,
    #[schema(example = 25)]
    cook_time_minutes: Option<u32>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for a page of recipes.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RecipePageSchema {
    items: Vec<RecipeSchema>,
    total_items: u64,
    item_count: u64,
    /// Zero-based page index echoed back.
    current_page: u64,
    items_per_page: u64,
}

/// OpenAPI schema for the unified recipe lookup result: a single recipe when
/// `id` is supplied, otherwise a page.
pub struct RecipeFindResultSchema;

impl PartialSchema for RecipeFindResultSchema {
    fn schema() -> RefOr<Schema> {
        RefOr::T(Schema::OneOf(
            OneOfBuilder::new()
                .item(Ref::from_schema_name(RecipeSchema::name()))
                .item(Ref::from_schema_name(RecipePageSchema::name()))
                .build(),
        ))
    }
}

impl ToSchema for RecipeFindResultSchema {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("RecipeFindResult")
    }
}

/// OpenAPI schema for [`crate::domain::AffectedRows`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AffectedRows)]
pub struct AffectedRowsSchema {
    #[schema(example = 1)]
    affected: u64,
}

/// OpenAPI schema for [`crate::domain::SessionToken`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SessionToken, rename_all = "camelCase")]
pub struct SessionTokenSchema {
    access_token: String,
    #[schema(example = "Bearer")]
    token_type: String,
    /// Seconds until expiry.
    #[schema(example = 86400)]
    expires_in: u64,
}
