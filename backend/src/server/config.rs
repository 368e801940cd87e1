//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use recipe_backend::outbound::media::CloudinaryConfig;
use recipe_backend::outbound::persistence::DbPool;
use zeroize::Zeroizing;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) jwt_secret: Option<Zeroizing<String>>,
    pub(crate) jwt_ttl: chrono::Duration,
    pub(crate) bcrypt_cost: u32,
    pub(crate) upload: Option<CloudinaryConfig>,
    pub(crate) upload_timeout: Duration,
}

impl ServerConfig {
    /// Construct a configuration with default token, hashing and upload
    /// settings.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool) -> Self {
        Self {
            bind_addr,
            db_pool,
            jwt_secret: None,
            jwt_ttl: chrono::Duration::hours(24),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            upload: None,
            upload_timeout: Duration::from_secs(30),
        }
    }

    /// Sign tokens with `secret` for `ttl`; without a secret an ephemeral
    /// one is generated.
    #[must_use]
    pub fn with_tokens(mut self, secret: Option<String>, ttl: chrono::Duration) -> Self {
        self.jwt_secret = secret.map(Zeroizing::new);
        self.jwt_ttl = ttl;
        self
    }

    /// Set the bcrypt work factor.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Attach image host credentials.
    #[must_use]
    pub fn with_upload(mut self, upload: Option<CloudinaryConfig>, timeout: Duration) -> Self {
        self.upload = upload;
        self.upload_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
