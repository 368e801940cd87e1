//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns a domain `invalid_request` error whose `details`
//! carry `{ field, code }` plus the offending `value` where echoing it is
//! safe.

use std::fmt::Display;

use pagination::PageWindowError;
use serde_json::json;

use crate::domain::{
    AvatarPayloadError, Error, LoginValidationError, RecipeId, RecipeValidationError, UserId,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn invalid_field_error(field: FieldName, message: impl Display) -> Error {
    ValidationError::new(field.as_str(), message.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_recipe_id(value: &str, field: FieldName) -> Result<RecipeId, Error> {
    RecipeId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Map a user value error to the request field it came from.
pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    let field = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => "id",
        UserValidationError::EmptyDisplayName
        | UserValidationError::DisplayNameTooShort { .. }
        | UserValidationError::DisplayNameTooLong { .. }
        | UserValidationError::DisplayNameInvalidCharacters => "name",
        UserValidationError::EmptyEmail
        | UserValidationError::EmailTooLong { .. }
        | UserValidationError::InvalidEmail => "email",
        UserValidationError::UnknownRole { .. } => "role",
        UserValidationError::InvalidAvatarUrl => "avatar",
    };
    invalid_field_error(FieldName::new(field), err)
}

pub(crate) fn login_validation_error(err: &LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail(inner) => user_validation_error(inner),
        other => invalid_field_error(FieldName::new("password"), other),
    }
}

pub(crate) fn recipe_validation_error(err: &RecipeValidationError) -> Error {
    let details = match err {
        RecipeValidationError::BlankIngredient { index }
        | RecipeValidationError::IngredientTooLong { index, .. } => json!({
            "field": err.field(),
            "index": index,
            "code": ErrorCode::InvalidValue.as_str(),
        }),
        _ => json!({
            "field": err.field(),
            "code": ErrorCode::InvalidValue.as_str(),
        }),
    };
    Error::invalid_request(err.to_string()).with_details(details)
}

pub(crate) fn avatar_validation_error(err: &AvatarPayloadError) -> Error {
    invalid_field_error(FieldName::new("image"), err)
}

pub(crate) fn page_window_error(field: FieldName, err: &PageWindowError) -> Error {
    let PageWindowError::LimitTooLarge { limit, .. } = err;
    ValidationError::new(field.as_str(), err.to_string())
        .with_value(ErrorCode::OutOfRange, limit.to_string())
}
