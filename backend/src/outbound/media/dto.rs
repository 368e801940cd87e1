//! DTOs for decoding image host JSON responses.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::ports::UploadReceipt;

/// Successful upload response; only the fields the adapter uses.
#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    pub(super) secure_url: String,
    #[serde(default)]
    pub(super) created_at: Option<DateTime<Utc>>,
}

impl From<UploadResponseDto> for UploadReceipt {
    fn from(value: UploadResponseDto) -> Self {
        Self {
            secure_url: value.secure_url,
            created_at: value.created_at,
        }
    }
}

/// Error envelope: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponseDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) message: String,
}
