//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (users, recipes,
//!   health)
//! - **Schemas**: Domain type wrappers ([`ErrorSchema`], [`UserSchema`],
//!   [`RecipeSchema`] and friends) that provide OpenAPI definitions without
//!   coupling domain types to the utoipa framework
//! - **Security**: Bearer token authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::recipes::{CreateRecipeRequest, UpdateRecipeRequest};
use crate::inbound::http::schemas::{
    AffectedRowsSchema, ErrorCodeSchema, ErrorSchema, RecipeFindResultSchema, RecipePageSchema,
    RecipeSchema, RoleSchema, SessionTokenSchema, UserPageSchema, UserSchema,
};
use crate::inbound::http::users::{
    AvatarRequest, CreateUserRequest, LoginRequest, UpdateRoleRequest, UpdateUserRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/v1/users/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe sharing API",
        description = "Accounts, bearer-token sessions and recipe publishing.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::update_user_role,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::upload_avatar,
        crate::inbound::http::recipes::find_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        UserPageSchema,
        RoleSchema,
        RecipeSchema,
        RecipePageSchema,
        RecipeFindResultSchema,
        AffectedRowsSchema,
        SessionTokenSchema,
        ErrorSchema,
        ErrorCodeSchema,
        CreateUserRequest,
        LoginRequest,
        UpdateUserRequest,
        UpdateRoleRequest,
        AvatarRequest,
        CreateRecipeRequest,
        UpdateRecipeRequest,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and avatars"),
        (name = "recipes", description = "Publishing and browsing recipes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
