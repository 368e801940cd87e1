//! Recipes API handlers.
//!
//! ```text
//! GET    /api/v1/recipes?id&userId&page&limit
//! POST   /api/v1/recipes          {"userId","title","ingredients","instructions",...}
//! PUT    /api/v1/recipes/{id}     {"title"?,"description"?,...}
//! DELETE /api/v1/recipes/{id}
//! ```
//!
//! Mutations load the recipe first so a missing recipe is reported as
//! `404` and a foreign one as `403` before any write reaches the store.

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageWindow;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Recipe, RecipeDraft, RecipeDraftParts, RecipeId, RecipeLookup, RecipePatch, RecipePatchParts,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::guards::{require_acting_as, require_author};
use crate::inbound::http::schemas::{
    AffectedRowsSchema, ErrorSchema, RecipeFindResultSchema, RecipeSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_window_error, parse_recipe_id, parse_user_id, recipe_validation_error,
};

const ID: FieldName = FieldName::new("id");
const USER_ID: FieldName = FieldName::new("userId");

/// Query parameters for `GET /api/v1/recipes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct FindRecipesQuery {
    /// Return this single recipe; takes precedence over `userId`.
    pub id: Option<String>,
    /// Only list recipes written by this user.
    pub user_id: Option<String>,
    /// Zero-based page index.
    pub page: Option<u32>,
    /// Page size, at most 100; zero or absent lists everything.
    pub limit: Option<u32>,
}

/// Create body for `POST /api/v1/recipes`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    /// Author; must be the caller.
    pub user_id: String,
    #[schema(example = "Shakshuka")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = json!(["6 eggs", "1 tin tomatoes"]))]
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[schema(example = 25)]
    pub cook_time_minutes: Option<u32>,
}

impl From<CreateRecipeRequest> for RecipeDraftParts {
    fn from(value: CreateRecipeRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            ingredients: value.ingredients,
            instructions: value.instructions,
            cook_time_minutes: value.cook_time_minutes,
        }
    }
}

/// Update body for `PUT /api/v1/recipes/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub cook_time_minutes: Option<u32>,
}

impl From<UpdateRecipeRequest> for RecipePatchParts {
    fn from(value: UpdateRecipeRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            ingredients: value.ingredients,
            instructions: value.instructions,
            cook_time_minutes: value.cook_time_minutes,
        }
    }
}

impl FindRecipesQuery {
    fn into_lookup(self) -> ApiResult<RecipeLookup> {
        let id = self
            .id
            .as_deref()
            .map(|raw| parse_recipe_id(raw, ID))
            .transpose()?;
        let user_id = self
            .user_id
            .as_deref()
            .map(|raw| parse_user_id(raw, USER_ID))
            .transpose()?;
        let window = PageWindow::from_page(self.limit.unwrap_or(0), self.page.unwrap_or(0))
            .map_err(|err| page_window_error(FieldName::new("limit"), &err))?;
        Ok(RecipeLookup::resolve(id, user_id, window))
    }
}

/// Load the recipe and check the caller wrote it.
async fn authored_recipe(
    state: &HttpState,
    caller: &AuthenticatedUser,
    id: &RecipeId,
) -> ApiResult<Recipe> {
    let recipe = state.recipes.find_one(id).await?;
    require_author(caller, &recipe)?;
    Ok(recipe)
}

/// Find one recipe, one author's recipes, or all recipes.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(FindRecipesQuery),
    responses(
        (status = 200, description = "A recipe when `id` is given, otherwise a page", body = RecipeFindResultSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe or author not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "findRecipes"
)]
#[get("/recipes")]
pub async fn find_recipes(
    _caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    query: web::Query<FindRecipesQuery>,
) -> ApiResult<HttpResponse> {
    let lookup = query.into_inner().into_lookup()?;
    let found = state.recipes.find(lookup).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// Publish a recipe on the caller's behalf.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Author is not the caller", body = ErrorSchema),
        (status = 404, description = "Author not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<CreateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let owner = parse_user_id(&request.user_id, USER_ID)?;
    require_acting_as(&caller, &owner)?;
    let draft = RecipeDraft::try_from_parts(owner, request.into())
        .map_err(|err| recipe_validation_error(&err))?;
    let recipe = state.recipes.create(draft).await?;
    Ok(HttpResponse::Created().json(recipe))
}

/// Edit a recipe the caller wrote.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[put("/recipes/{id}")]
pub async fn update_recipe(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_recipe_id(&path, ID)?;
    let patch = RecipePatch::try_from_parts(payload.into_inner().into())
        .map_err(|err| recipe_validation_error(&err))?;
    authored_recipe(&state, &caller, &id).await?;
    let recipe = state.recipes.update(&id, patch).await?;
    Ok(HttpResponse::Ok().json(recipe))
}

/// Delete a recipe the caller wrote.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Rows affected", body = AffectedRowsSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_recipe_id(&path, ID)?;
    authored_recipe(&state, &caller, &id).await?;
    let outcome = state.recipes.delete(&id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Register every recipe route on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(find_recipes)
        .service(create_recipe)
        .service(update_recipe)
        .service(delete_recipe);
}

#[cfg(test)]
mod tests;
