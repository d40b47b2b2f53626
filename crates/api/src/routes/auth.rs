//! Authentication routes for register, login and the current user.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tally_core::auth::{UserRole, hash_password, verify_password};
use tally_db::{CreateUserInput, UserRepository, entities::users};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    response::ApiResponse,
};

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Auth routes that need a bearer token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Request body for registration.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Login name.
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    /// Plain password, at least 8 characters.
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Plain password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// `admin` or `user`.
    pub role: UserRole,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<users::Model> for UserResponse {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role.into(),
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Issued bearer token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// JWT for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// The authenticated user.
    pub user: UserResponse,
}

fn issue_token(state: &AppState, user: users::Model) -> Result<TokenResponse, ApiError> {
    let role = UserRole::from(user.role);
    let access_token =
        state
            .jwt_service
            .generate_access_token(user.id, &user.username, role.as_str())?;
    Ok(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_expires_in(),
        user: user.into(),
    })
}

/// POST `/auth/register` - Create an account and log it in.
///
/// The very first account becomes an administrator; later ones are users.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());
    let role = if user_repo.any_exists().await? {
        UserRole::User
    } else {
        UserRole::Admin
    };

    let password_hash = hash_password(&payload.password)?;
    let user = user_repo
        .create(CreateUserInput {
            username: payload.username,
            email: payload.email,
            password_hash,
            role: role.into(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %role, "user registered");
    Ok(ApiResponse::created(
        "Registration successful",
        issue_token(&state, user)?,
    ))
}

/// POST `/auth/login` - Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Invalid credentials or disabled account")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_username(&payload.username)
        .await?;

    let stored = user.as_ref().map(|u| u.password_hash.as_str());
    let accepted = verify_password(&payload.password, stored)?;
    let Some(user) = user else {
        tracing::info!(username = %payload.username, "login attempt for unknown user");
        return Err(ApiError::unauthorized("Invalid username or password"));
    };
    if !accepted {
        tracing::info!(user_id = %user.id, "failed login attempt");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "login refused for disabled account");
        return Err(ApiError::unauthorized("This account has been disabled"));
    }

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::ok("Login successful", issue_token(&state, user)?))
}

/// GET `/auth/me` - The account behind the bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user = UserRepository::new((*state.db).clone())
        .find(auth.user_id())
        .await?;
    Ok(ApiResponse::ok("Current user", user.into()))
}
