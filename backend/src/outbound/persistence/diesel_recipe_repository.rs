//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageWindow;
use tracing::warn;

use crate::domain::ports::{RecipePersistenceError, RecipeRepository};
use crate::domain::{Recipe, RecipeId, RecipePatch, RecipeTitle, UserId};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, affected, constraint_violation, map_basic_diesel_error,
    map_basic_pool_error, sql_count, sql_offset,
};
use super::models::{NewRecipeRow, RecipeRow, RecipeUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::recipes;

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipePersistenceError {
    map_basic_pool_error(error, RecipePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipePersistenceError {
    map_basic_diesel_error(
        error,
        RecipePersistenceError::query,
        RecipePersistenceError::connection,
    )
}

fn cook_time_for_db(minutes: Option<u32>) -> Result<Option<i32>, RecipePersistenceError> {
    minutes
        .map(i32::try_from)
        .transpose()
        .map_err(|_| RecipePersistenceError::query("cook time does not fit the column"))
}

/// Convert a database row into a domain recipe.
fn row_to_recipe(row: RecipeRow) -> Result<Recipe, RecipePersistenceError> {
    let RecipeRow {
        id,
        user_id,
        title,
        description,
        ingredients,
        instructions,
        cook_time_minutes,
        created_at,
        updated_at,
    } = row;
    let title = RecipeTitle::new(title).map_err(|error| {
        warn!(recipe_id = %id, %error, "stored recipe row failed validation");
        RecipePersistenceError::query("stored recipe has an invalid title")
    })?;
    let cook_time_minutes = cook_time_minutes
        .map(u32::try_from)
        .transpose()
        .map_err(|_| RecipePersistenceError::query("stored recipe has a negative cook time"))?;
    Ok(Recipe {
        id: RecipeId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        title,
        description,
        ingredients,
        instructions,
        cook_time_minutes,
        created_at,
        updated_at,
    })
}

fn rows_to_recipes(rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, RecipePersistenceError> {
    rows.into_iter().map(row_to_recipe).collect()
}

impl DieselRecipeRepository {
    async fn load_page(
        &self,
        owner: Option<&UserId>,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count = recipes::table.count().into_boxed();
        let mut query = recipes::table
            .select(RecipeRow::as_select())
            .order_by((recipes::created_at.desc(), recipes::id.asc()))
            .offset(sql_offset(window.offset()))
            .into_boxed();
        if let Some(owner) = owner {
            count = count.filter(recipes::user_id.eq(*owner.as_uuid()));
            query = query.filter(recipes::user_id.eq(*owner.as_uuid()));
        }
        if let Some(limit) = window.limit() {
            query = query.limit(i64::from(limit));
        }

        let total: i64 = count
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<RecipeRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        Ok((rows_to_recipes(rows)?, sql_count(total)))
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewRecipeRow {
            id: *recipe.id.as_uuid(),
            user_id: *recipe.user_id.as_uuid(),
            title: recipe.title.as_ref(),
            description: recipe.description.as_deref(),
            ingredients: &recipe.ingredients,
            instructions: &recipe.instructions,
            cook_time_minutes: cook_time_for_db(recipe.cook_time_minutes)?,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        };

        diesel::insert_into(recipes::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match constraint_violation(&error) {
                Some(ConstraintViolation::ForeignKey) => {
                    RecipePersistenceError::missing_owner(recipe.user_id.to_string())
                }
                _ => map_diesel_error(error),
            })
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RecipeRow> = recipes::table
            .find(id.as_uuid())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_recipe).transpose()
    }

    async fn find_page(
        &self,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError> {
        self.load_page(None, window).await
    }

    async fn find_page_by_owner(
        &self,
        user_id: &UserId,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError> {
        self.load_page(Some(user_id), window).await
    }

    async fn update(
        &self,
        id: &RecipeId,
        patch: &RecipePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = RecipeUpdate {
            title: patch.title.as_ref().map(AsRef::as_ref),
            description: patch.description.as_ref().map(Option::as_deref),
            ingredients: patch.ingredients.as_ref(),
            instructions: patch.instructions.as_deref(),
            cook_time_minutes: cook_time_for_db(patch.cook_time_minutes)?,
            updated_at,
        };

        let row: Option<RecipeRow> = diesel::update(recipes::table.find(id.as_uuid()))
            .set(&changes)
            .returning(RecipeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_recipe).transpose()
    }

    async fn delete(&self, id: &RecipeId) -> Result<u64, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(recipes::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }
}
