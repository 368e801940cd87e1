//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `RECIPES_*` environment variables and config
//! files, in increasing order of precedence for the later sources.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use recipe_backend::outbound::media::CloudinaryConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_JWT_TTL_HOURS: i64 = 24;
const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Errors raised when settings are missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    /// A value was supplied but could not be parsed.
    #[error("invalid setting `{key}`: {message}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Parser diagnostic.
        message: String,
    },
}

/// Runtime configuration for the recipe service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// HMAC secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Token lifetime in hours.
    pub jwt_ttl_hours: Option<i64>,
    /// bcrypt work factor.
    pub bcrypt_cost: Option<u32>,
    /// Image host API root.
    pub upload_base_url: Option<String>,
    /// Image host account name.
    pub upload_cloud_name: Option<String>,
    /// Image host API key.
    pub upload_api_key: Option<String>,
    /// Image host API secret.
    pub upload_api_secret: Option<String>,
    /// Folder uploads are stored under.
    pub upload_folder: Option<String>,
    /// Image host request timeout in seconds.
    pub upload_timeout_secs: Option<u64>,
}

impl AppSettings {
    /// Listener address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                key: "bind_addr",
                message: err.to_string(),
            })
    }

    /// Database URL; startup cannot proceed without one.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing("database_url"))
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Token lifetime; non-positive values are rejected.
    pub fn jwt_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        let hours = self.jwt_ttl_hours.unwrap_or(DEFAULT_JWT_TTL_HOURS);
        if hours <= 0 {
            return Err(SettingsError::Invalid {
                key: "jwt_ttl_hours",
                message: format!("must be positive, got {hours}"),
            });
        }
        chrono::Duration::try_hours(hours).ok_or(SettingsError::Invalid {
            key: "jwt_ttl_hours",
            message: format!("{hours} hours is out of range"),
        })
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upload_timeout_secs
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        )
    }

    /// Image host account, or `None` when its credentials are incomplete.
    pub fn upload_config(&self) -> Result<Option<CloudinaryConfig>, SettingsError> {
        let (Some(cloud_name), Some(api_key), Some(api_secret)) = (
            self.upload_cloud_name.as_ref(),
            self.upload_api_key.as_ref(),
            self.upload_api_secret.as_ref(),
        ) else {
            return Ok(None);
        };
        let base_url = self
            .upload_base_url
            .as_deref()
            .unwrap_or(DEFAULT_UPLOAD_BASE_URL);
        let base_url = Url::parse(base_url).map_err(|err| SettingsError::Invalid {
            key: "upload_base_url",
            message: err.to_string(),
        })?;
        Ok(Some(CloudinaryConfig {
            base_url,
            cloud_name: cloud_name.clone(),
            api_key: api_key.clone(),
            api_secret: Zeroizing::new(api_secret.clone()),
            folder: self.upload_folder.clone(),
        }))
    }
}
