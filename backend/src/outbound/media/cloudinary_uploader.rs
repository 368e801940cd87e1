//! Reqwest-backed image uploader for Cloudinary-compatible hosts.
//!
//! This adapter owns transport details only: request signing, form
//! serialisation, timeout and HTTP error mapping, and JSON decoding into an
//! [`UploadReceipt`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, StatusCode, Url};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{ErrorResponseDto, UploadResponseDto};
use crate::domain::AvatarPayload;
use crate::domain::ports::{ImageUploadError, ImageUploader, UploadReceipt};

const SIGNATURE_ALGORITHM: &str = "sha256";

/// Account settings for the image host.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// API root, e.g. `https://api.cloudinary.com`.
    pub base_url: Url,
    /// Cloud (account) name in the upload path.
    pub cloud_name: String,
    /// Public API key.
    pub api_key: String,
    /// API secret used to sign requests.
    pub api_secret: Zeroizing<String>,
    /// Optional folder uploads are stored under.
    pub folder: Option<String>,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("base_url", &self.base_url.as_str())
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"**redacted**")
            .field("folder", &self.folder)
            .finish()
    }
}

/// Image uploader performing signed form uploads.
pub struct CloudinaryUploader {
    client: Client,
    endpoint: Url,
    api_key: String,
    api_secret: Zeroizing<String>,
    folder: Option<String>,
    clock: Arc<dyn Clock>,
}

/// Errors raised while constructing the uploader.
#[derive(Debug, thiserror::Error)]
pub enum CloudinaryBuildError {
    /// The upload endpoint could not be derived from the base URL.
    #[error("invalid upload endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl CloudinaryUploader {
    /// Build an uploader with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint URL is invalid or the reqwest
    /// client cannot be constructed.
    pub fn new(
        config: CloudinaryConfig,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CloudinaryBuildError> {
        let endpoint = upload_endpoint(&config.base_url, &config.cloud_name)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            api_secret: config.api_secret,
            folder: config.folder,
            clock,
        })
    }
}

fn upload_endpoint(base: &Url, cloud_name: &str) -> Result<Url, url::ParseError> {
    let root = if base.as_str().ends_with('/') {
        base.clone()
    } else {
        Url::parse(&format!("{}/", base.as_str()))?
    };
    root.join(&format!("v1_1/{cloud_name}/image/upload"))
}

/// Hex SHA-256 over the sorted `key=value` pairs joined by `&`, followed by
/// the secret.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable_by(|left, right| left.0.cmp(right.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload(&self, payload: &AvatarPayload) -> Result<UploadReceipt, ImageUploadError> {
        let timestamp = self.clock.utc().timestamp().to_string();
        let mut signed: Vec<(&str, &str)> = vec![("timestamp", timestamp.as_str())];
        if let Some(folder) = self.folder.as_deref() {
            signed.push(("folder", folder));
        }
        let signature = sign(&signed, &self.api_secret);

        let mut form = signed;
        form.extend([
            ("file", payload.as_upload_source()),
            ("api_key", self.api_key.as_str()),
            ("signature_algorithm", SIGNATURE_ALGORITHM),
            ("signature", signature.as_str()),
        ]);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let receipt = parse_receipt(body.as_ref())?;
        debug!(secure_url = %receipt.secure_url, "image uploaded");
        Ok(receipt)
    }
}

fn parse_receipt(body: &[u8]) -> Result<UploadReceipt, ImageUploadError> {
    serde_json::from_slice::<UploadResponseDto>(body)
        .map(UploadReceipt::from)
        .map_err(|error| ImageUploadError::decode(format!("invalid upload response: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> ImageUploadError {
    warn!(%error, timeout = error.is_timeout(), "image host request failed");
    ImageUploadError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageUploadError {
    let message = serde_json::from_slice::<ErrorResponseDto>(body).map_or_else(
        |_| format!("status {}", status.as_u16()),
        |envelope| envelope.error.message,
    );
    if status.is_client_error() {
        ImageUploadError::rejected(message)
    } else {
        ImageUploadError::transport(message)
    }
}
