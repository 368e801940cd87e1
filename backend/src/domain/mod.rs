//! Domain primitives, ports and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, the ports adapters implement, and the directory
//! services that orchestrate them. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, Recipe: aggregates exposed to callers.
//! - UserDirectoryService, RecipeDirectoryService: driving port
//!   implementations.

pub mod auth;
pub mod avatar;
pub mod error;
pub mod ports;
pub mod recipe;
pub mod trace_id;
pub mod user;

mod affected_rows;
mod recipe_directory;
mod user_directory;

pub use self::affected_rows::AffectedRows;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MAX_BYTES, PASSWORD_MIN_BYTES, PasswordHash,
    PlainPassword, SessionToken, TokenClaims,
};
pub use self::avatar::{AVATAR_MAX_BYTES, AvatarPayload, AvatarPayloadError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::recipe::{
    Recipe, RecipeDraft, RecipeDraftParts, RecipeFindResult, RecipeId, RecipeLookup, RecipePatch,
    RecipePatchParts, RecipeTitle, RecipeValidationError,
};
pub use self::recipe_directory::RecipeDirectoryService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AvatarUrl, DisplayName, Email, NewUser, Role, StoredUser, User, UserId, UserPatch,
    UserValidationError,
};
pub use self::user_directory::UserDirectoryService;
