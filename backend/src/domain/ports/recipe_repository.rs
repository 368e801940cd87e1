//! Port abstraction for recipe persistence adapters and their errors.
use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::{Recipe, RecipeId, RecipePatch, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by recipe repository adapters.
    pub enum RecipePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// The referenced owner does not exist.
        MissingOwner { user_id: String } => "recipe owner does not exist: {user_id}",
    }
}

/// Driven port over the recipe store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Persist a new recipe.
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipePersistenceError>;

    /// Fetch a recipe by identifier.
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipePersistenceError>;

    /// Fetch one page of all recipes, newest first, with the total count.
    async fn find_page(
        &self,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError>;

    /// Fetch one page of one user's recipes, newest first, with their total.
    async fn find_page_by_owner(
        &self,
        user_id: &UserId,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError>;

    /// Apply a patch and return the updated row, or `None` if it is gone.
    async fn update(
        &self,
        id: &RecipeId,
        patch: &RecipePatch,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<Recipe>, RecipePersistenceError>;

    /// Remove a recipe.
    async fn delete(&self, id: &RecipeId) -> Result<u64, RecipePersistenceError>;
}
