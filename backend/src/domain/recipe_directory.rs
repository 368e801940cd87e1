//! Recipe directory domain service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SubsecRound;
use mockable::Clock;
use pagination::{PageWindow, Paginated};
use tracing::info;

use crate::domain::ports::{RecipeDirectory, RecipePersistenceError, RecipeRepository};
use crate::domain::{
    AffectedRows, Error, Recipe, RecipeDraft, RecipeFindResult, RecipeId, RecipeLookup,
    RecipePatch, UserId,
};

const RECIPE_NOT_FOUND: &str = "recipe not found";

/// Recipe directory service implementing [`RecipeDirectory`].
#[derive(Clone)]
pub struct RecipeDirectoryService<R> {
    recipes: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RecipeDirectoryService<R> {
    /// Create a new service over the given repository.
    pub fn new(recipes: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { recipes, clock }
    }
}

impl<R> RecipeDirectoryService<R>
where
    R: RecipeRepository,
{
    fn map_recipe_error(error: RecipePersistenceError) -> Error {
        match error {
            RecipePersistenceError::Connection { message } => {
                Error::service_unavailable(format!("recipe repository unavailable: {message}"))
            }
            RecipePersistenceError::Query { message } => {
                Error::internal(format!("recipe repository error: {message}"))
            }
            RecipePersistenceError::MissingOwner { user_id } => {
                Error::not_found(format!("user {user_id} not found"))
            }
        }
    }
}

#[async_trait]
impl<R> RecipeDirectory for RecipeDirectoryService<R>
where
    R: RecipeRepository,
{
    async fn find(&self, lookup: RecipeLookup) -> Result<RecipeFindResult, Error> {
        match lookup {
            RecipeLookup::ById(id) => self.find_one(&id).await.map(RecipeFindResult::One),
            RecipeLookup::ByOwner { user_id, window } => self
                .find_by_user(&user_id, window)
                .await
                .map(RecipeFindResult::Page),
            RecipeLookup::All { window } => {
                self.find_all(window).await.map(RecipeFindResult::Page)
            }
        }
    }

    async fn find_one(&self, id: &RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find_by_id(id)
            .await
            .map_err(Self::map_recipe_error)?
            .ok_or_else(|| Error::not_found(RECIPE_NOT_FOUND))
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
        window: PageWindow,
    ) -> Result<Paginated<Recipe>, Error> {
        let (rows, total) = self
            .recipes
            .find_page_by_owner(user_id, window)
            .await
            .map_err(Self::map_recipe_error)?;
        Ok(Paginated::new(rows, total, window))
    }

    async fn find_all(&self, window: PageWindow) -> Result<Paginated<Recipe>, Error> {
        let (rows, total) = self
            .recipes
            .find_page(window)
            .await
            .map_err(Self::map_recipe_error)?;
        Ok(Paginated::new(rows, total, window))
    }

    async fn create(&self, draft: RecipeDraft) -> Result<Recipe, Error> {
        let now = self.clock.utc().trunc_subsecs(6);
        let RecipeDraft {
            user_id,
            title,
            description,
            ingredients,
            instructions,
            cook_time_minutes,
        } = draft;
        let recipe = Recipe {
            id: RecipeId::random(),
            user_id,
            title,
            description,
            ingredients,
            instructions,
            cook_time_minutes,
            created_at: now,
            updated_at: now,
        };
        self.recipes
            .insert(&recipe)
            .await
            .map_err(Self::map_recipe_error)?;
        info!(recipe_id = %recipe.id, user_id = %recipe.user_id, "recipe created");
        Ok(recipe)
    }

    async fn update(&self, id: &RecipeId, patch: RecipePatch) -> Result<Recipe, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request(
                "update must change at least one field",
            ));
        }
        let updated_at = self.clock.utc().trunc_subsecs(6);
        let recipe = self
            .recipes
            .update(id, &patch, updated_at)
            .await
            .map_err(Self::map_recipe_error)?
            .ok_or_else(|| Error::not_found(RECIPE_NOT_FOUND))?;
        info!(recipe_id = %id, "recipe updated");
        Ok(recipe)
    }

    async fn delete(&self, id: &RecipeId) -> Result<AffectedRows, Error> {
        let affected = self
            .recipes
            .delete(id)
            .await
            .map_err(Self::map_recipe_error)?;
        info!(recipe_id = %id, affected, "recipe deleted");
        Ok(AffectedRows::new(affected))
    }
}

#[cfg(test)]
#[path = "recipe_directory_tests.rs"]
mod tests;
