//! Builders wiring adapters into the HTTP handler state.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use recipe_backend::domain::ports::{ImageUploadError, ImageUploader, UploadReceipt};
use recipe_backend::domain::{AvatarPayload, RecipeDirectoryService, UserDirectoryService};
use recipe_backend::inbound::http::state::HttpState;
use recipe_backend::outbound::media::CloudinaryUploader;
use recipe_backend::outbound::persistence::{DieselRecipeRepository, DieselUserRepository};
use recipe_backend::outbound::security::{BcryptPasswordHasher, JwtConfig, JwtTokenIssuer};

use super::ServerConfig;

/// Stand-in used when no image host credentials are configured.
///
/// Every upload fails as a transport error, which callers see as 503.
#[derive(Debug, Clone, Copy, Default)]
struct UnconfiguredImageHost;

#[async_trait]
impl ImageUploader for UnconfiguredImageHost {
    async fn upload(&self, _payload: &AvatarPayload) -> Result<UploadReceipt, ImageUploadError> {
        Err(ImageUploadError::transport("image host is not configured"))
    }
}

fn build_uploader(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn ImageUploader>> {
    match config.upload.clone() {
        Some(upload) => {
            let uploader = CloudinaryUploader::new(upload, config.upload_timeout, clock)
                .map_err(|err| std::io::Error::other(format!("image host client: {err}")))?;
            Ok(Arc::new(uploader))
        }
        None => {
            warn!("image host credentials missing; avatar uploads will fail");
            Ok(Arc::new(UnconfiguredImageHost))
        }
    }
}

fn jwt_config(config: &ServerConfig) -> JwtConfig {
    match config.jwt_secret.as_deref() {
        Some(secret) => JwtConfig::new(secret.as_bytes(), config.jwt_ttl),
        None => JwtConfig::with_random_secret(config.jwt_ttl),
    }
}

/// Assemble the user and recipe directories over the Diesel, bcrypt, JWT and
/// image host adapters.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an adapter cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let hasher = BcryptPasswordHasher::new(config.bcrypt_cost)
        .map_err(|err| std::io::Error::other(format!("password hasher: {err}")))?;
    let tokens = Arc::new(JwtTokenIssuer::new(&jwt_config(config), Arc::clone(&clock)));
    let uploader = build_uploader(config, Arc::clone(&clock))?;

    let users = UserDirectoryService::new(
        Arc::new(DieselUserRepository::new(config.db_pool.clone())),
        Arc::new(hasher),
        Arc::clone(&tokens),
        uploader,
        Arc::clone(&clock),
    );
    let recipes = RecipeDirectoryService::new(
        Arc::new(DieselRecipeRepository::new(config.db_pool.clone())),
        clock,
    );

    Ok(web::Data::new(HttpState::new(
        Arc::new(users),
        Arc::new(recipes),
        tokens,
    )))
}
