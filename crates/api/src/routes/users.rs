//! User administration routes (admin role only).

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use tally_core::auth::{UserRole, hash_password};
use tally_db::{UpdateUserInput, UserRepository};
use tally_shared::PagedList;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::auth::UserResponse;
use crate::{
    AppState,
    error::ApiError,
    extractors::{Path, Query, ValidatedJson},
    middleware::AdminUser,
    query::ListQuery,
    response::ApiResponse,
};

/// Creates the user administration routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users)).route(
        "/users/{id}",
        get(get_user).patch(update_user).delete(delete_user),
    )
}

/// Request body for updating a user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New email address.
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    /// New password; stored hashed.
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// Enables or disables login.
    pub is_active: Option<bool>,
}

/// GET `/users` - List users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListQuery),
    responses(
        (status = 200, description = "Paged users", body = [UserResponse]),
        (status = 403, description = "Administrator role required")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(list): Query<ListQuery>,
) -> Result<ApiResponse<PagedList<UserResponse>>, ApiError> {
    let page = UserRepository::new((*state.db).clone())
        .list(&list.filter(), &list.page())
        .await?;
    Ok(ApiResponse::ok("Users retrieved", page.map(UserResponse::from)))
}

/// GET `/users/{id}` - Get a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user = UserRepository::new((*state.db).clone()).find(id).await?;
    Ok(ApiResponse::ok("User retrieved", user.into()))
}

/// PATCH `/users/{id}` - Update a user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    request_body = UpdateUserRequest,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;
    let user = UserRepository::new((*state.db).clone())
        .update(
            id,
            UpdateUserInput {
                email: payload.email,
                password_hash,
                role: payload.role.map(Into::into),
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::ok("User updated", user.into()))
}

/// DELETE `/users/{id}` - Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Administrators cannot delete themselves"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    if admin.user_id() == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    UserRepository::new((*state.db).clone()).delete(id).await?;
    Ok(ApiResponse::ok("User deleted", ()))
}
