//! Port for the remote image host used for avatars.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::AvatarPayload;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image upload adapters.
    pub enum ImageUploadError {
        /// The host could not be reached or failed on its side.
        Transport { message: String } => "image host transport failed: {message}",
        /// The host refused the payload.
        Rejected { message: String } => "image host rejected the upload: {message}",
        /// The host answered with a body we could not read.
        Decode { message: String } => "image host response could not be decoded: {message}",
    }
}

/// Successful upload as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Durable HTTPS location of the stored image.
    pub secure_url: String,
    /// Creation time reported by the host; absent on incomplete responses.
    pub created_at: Option<DateTime<Utc>>,
}

/// Sends image payloads to a remote host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload one image.
    async fn upload(&self, payload: &AvatarPayload) -> Result<UploadReceipt, ImageUploadError>;
}
