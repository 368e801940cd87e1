//! Driving port for recipe use-cases.

use async_trait::async_trait;
use pagination::{PageWindow, Paginated};

use crate::domain::{
    AffectedRows, Error, Recipe, RecipeDraft, RecipeFindResult, RecipeId, RecipeLookup,
    RecipePatch, UserId,
};

/// Domain use-case port for recipes.
///
/// Ownership checks happen in the inbound adapter before `update` or `delete`
/// are called.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeDirectory: Send + Sync {
    /// Unified lookup dispatching on the most specific identifier given.
    async fn find(&self, lookup: RecipeLookup) -> Result<RecipeFindResult, Error>;

    /// Fetch one recipe.
    async fn find_one(&self, id: &RecipeId) -> Result<Recipe, Error>;

    /// Fetch a page of one user's recipes.
    async fn find_by_user(
        &self,
        user_id: &UserId,
        window: PageWindow,
    ) -> Result<Paginated<Recipe>, Error>;

    /// Fetch a page of all recipes.
    async fn find_all(&self, window: PageWindow) -> Result<Paginated<Recipe>, Error>;

    /// Store a new recipe.
    async fn create(&self, draft: RecipeDraft) -> Result<Recipe, Error>;

    /// Apply a patch and return the updated recipe.
    async fn update(&self, id: &RecipeId, patch: RecipePatch) -> Result<Recipe, Error>;

    /// Remove a recipe.
    async fn delete(&self, id: &RecipeId) -> Result<AffectedRows, Error>;
}
