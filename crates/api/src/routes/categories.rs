//! Income and expense category routes.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tally_core::records::CategoryType;
use tally_db::{
    CategoryFilter, CategoryRepository, CreateCategoryInput, UpdateCategoryInput,
    entities::categories,
};
use tally_shared::PagedList;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    extractors::{Path, Query, ValidatedJson},
    middleware::Tenant,
    query::{ListQuery, double_option},
    response::ApiResponse,
};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

/// Category-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Only categories of this kind.
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
}

/// Request body for creating a category.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// Name, unique within the company.
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    /// New name.
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
    /// New kind.
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
}

/// Category as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Category ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Kind.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<categories::Model> for CategoryResponse {
    fn from(c: categories::Model) -> Self {
        Self {
            id: c.id,
            company_id: c.company_id,
            name: c.name,
            description: c.description,
            category_type: c.category_type.into(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// GET `/categories` - List categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(ListQuery, CategoryQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Paged categories", body = [CategoryResponse])),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(query): Query<CategoryQuery>,
) -> Result<ApiResponse<PagedList<CategoryResponse>>, ApiError> {
    let filter = CategoryFilter {
        category_type: query.category_type.map(Into::into),
    };
    let page = CategoryRepository::new((*state.db).clone())
        .list(tenant.id(), &list.filter(), &filter, &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Categories retrieved",
        page.map(CategoryResponse::from),
    ))
}

/// POST `/categories` - Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already used in this company")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> Result<ApiResponse<CategoryResponse>, ApiError> {
    let category = CategoryRepository::new((*state.db).clone())
        .create(CreateCategoryInput {
            company_id: tenant.id(),
            name: payload.name,
            description: payload.description,
            category_type: payload.category_type.into(),
        })
        .await?;
    Ok(ApiResponse::created("Category created", category.into()))
}

/// GET `/categories/{id}` - Get a category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn get_category(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<CategoryResponse>, ApiError> {
    let category = CategoryRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Category retrieved", category.into()))
}

/// PATCH `/categories/{id}` - Update a category.
#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    request_body = UpdateCategoryRequest,
    params(("id" = Uuid, Path, description = "Category ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Name already used in this company")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> Result<ApiResponse<CategoryResponse>, ApiError> {
    let category = CategoryRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateCategoryInput {
                name: payload.name,
                description: payload.description,
                category_type: payload.category_type.map(Into::into),
            },
        )
        .await?;
    Ok(ApiResponse::ok("Category updated", category.into()))
}

/// DELETE `/categories/{id}` - Delete a category.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Still referenced by records")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    CategoryRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Category deleted", ()))
}
