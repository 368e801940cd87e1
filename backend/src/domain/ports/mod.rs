//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod image_uploader;
mod password_hasher;
mod recipe_directory;
mod recipe_repository;
mod token_issuer;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use image_uploader::MockImageUploader;
pub use image_uploader::{ImageUploadError, ImageUploader, UploadReceipt};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{CredentialError, PasswordHasher};
#[cfg(test)]
pub use recipe_directory::MockRecipeDirectory;
pub use recipe_directory::RecipeDirectory;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipePersistenceError, RecipeRepository};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
