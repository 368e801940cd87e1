//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users                {"name","email","password"}
//! POST   /api/v1/users/login          {"email","password"}
//! GET    /api/v1/users?limit&offset&name
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}           {"name"?,"email"?}
//! PUT    /api/v1/users/{id}/role      {"role"}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/users/{id}/avatar    {"image"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageWindow;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AvatarPayload, DisplayName, Email, LoginCredentials, NewUser, PlainPassword, Role, UserPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::avatar_json_config;
use crate::inbound::http::guards::{require_admin, require_self, require_self_or_admin};
use crate::inbound::http::schemas::{
    AffectedRowsSchema, ErrorSchema, SessionTokenSchema, UserPageSchema, UserSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, avatar_validation_error, login_validation_error, missing_field_error,
    page_window_error, parse_user_id, user_validation_error,
};

const ID: FieldName = FieldName::new("id");

/// Signup request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Between 8 and 72 bytes.
    pub password: String,
}

impl CreateUserRequest {
    fn into_new_user(self) -> ApiResult<NewUser> {
        let name = DisplayName::new(self.name).map_err(|err| user_validation_error(&err))?;
        let email = Email::new(&self.email).map_err(|err| user_validation_error(&err))?;
        let password =
            PlainPassword::new(&self.password).map_err(|err| login_validation_error(&err))?;
        Ok(NewUser {
            name,
            email,
            password,
        })
    }
}

/// Login request body for `POST /api/v1/users/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Query parameters for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page size, at most 100; zero or absent lists everything.
    pub limit: Option<u32>,
    /// Number of users to skip.
    pub offset: Option<u64>,
    /// Exact display name to search for; disables pagination.
    pub name: Option<String>,
}

/// Profile update body for `PUT /api/v1/users/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    fn into_patch(self) -> ApiResult<UserPatch> {
        let name = self
            .name
            .map(DisplayName::new)
            .transpose()
            .map_err(|err| user_validation_error(&err))?;
        let email = self
            .email
            .map(Email::new)
            .transpose()
            .map_err(|err| user_validation_error(&err))?;
        Ok(UserPatch { name, email })
    }
}

/// Role change body for `PUT /api/v1/users/{id}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateRoleRequest {
    #[schema(example = "editor")]
    pub role: Option<String>,
}

/// Avatar upload body for `POST /api/v1/users/{id}/avatar`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvatarRequest {
    /// `http(s)` image URL or `data:image/<type>;base64,<data>` URI.
    #[schema(example = "https://images.example.com/ada.png")]
    pub image: Option<String>,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let candidate = payload.into_inner().into_new_user()?;
    let user = state.users.create(candidate).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionTokenSchema),
        (status = 400, description = "Invalid request or wrong password", body = ErrorSchema),
        (status = 404, description = "No account with this email", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(|err| login_validation_error(&err))?;
    let token = state.users.login(credentials).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// List accounts, or search them by exact display name.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "A page of users, or every user with the given name", body = UserPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    _caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<HttpResponse> {
    let ListUsersQuery {
        limit,
        offset,
        name,
    } = query.into_inner();
    if let Some(name) = name {
        let name = DisplayName::new(name).map_err(|err| user_validation_error(&err))?;
        let users = state.users.search(&name).await?;
        return Ok(HttpResponse::Ok().json(users));
    }
    let window = PageWindow::from_offset(limit.unwrap_or(0), offset.unwrap_or(0))
        .map_err(|err| page_window_error(FieldName::new("limit"), &err))?;
    let page = state.users.find_all(window).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Fetch one account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    _caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, ID)?;
    let user = state.users.find_one(&id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Update the caller's own profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Rows affected", body = AffectedRowsSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not your account", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, ID)?;
    require_self(&caller, &id)?;
    let patch = payload.into_inner().into_patch()?;
    let outcome = state.users.update_one(&id, patch).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Change an account's role.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Rows affected", body = AffectedRowsSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUserRole"
)]
#[put("/users/{id}/role")]
pub async fn update_user_role(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRoleRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, ID)?;
    require_admin(&caller)?;
    let raw = payload
        .into_inner()
        .role
        .ok_or_else(|| missing_field_error(FieldName::new("role")))?;
    let role = raw
        .parse::<Role>()
        .map_err(|err| user_validation_error(&err))?;
    let outcome = state.users.update_role(&id, role).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Rows affected", body = AffectedRowsSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not your account", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, ID)?;
    require_self_or_admin(&caller, &id)?;
    let outcome = state.users.delete_one(&id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Upload a new avatar for the caller's own account.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/avatar",
    params(("id" = String, Path, description = "User id")),
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "User with the new avatar", body = UserSchema),
        (status = 400, description = "Invalid image or upload refused", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not your account", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Image host unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "uploadAvatar"
)]
pub async fn upload_avatar(
    caller: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, ID)?;
    require_self(&caller, &id)?;
    let raw = payload
        .into_inner()
        .image
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let image = AvatarPayload::parse(&raw).map_err(|err| avatar_validation_error(&err))?;
    let user = state.users.upload_avatar(&id, image).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Register every user route on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user)
        .service(login)
        .service(list_users)
        .service(get_user)
        .service(update_user)
        .service(update_user_role)
        .service(delete_user)
        .service(
            web::resource("/users/{id}/avatar")
                .app_data(avatar_json_config())
                .route(web::post().to(upload_avatar)),
        );
}

#[cfg(test)]
mod tests;
