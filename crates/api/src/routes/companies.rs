//! Company (tenant) routes.
//!
//! Companies are not tenant-scoped themselves; any authenticated user can
//! manage them.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tally_db::{CompanyRepository, CreateCompanyInput, UpdateCompanyInput, entities::companies};
use tally_shared::PagedList;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    extractors::{Path, Query, ValidatedJson},
    query::{ListQuery, double_option},
    response::ApiResponse,
};

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{id}",
            get(get_company)
                .patch(update_company)
                .delete(delete_company),
        )
}

/// Request body for creating a company.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    /// Name, unique across the system.
    #[validate(length(min = 1, max = 150, message = "name must be 1-150 characters"))]
    pub name: String,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Request body for updating a company.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    /// New name.
    #[validate(length(min = 1, max = 150, message = "name must be 1-150 characters"))]
    pub name: Option<String>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
    /// Inactive companies are refused by the tenant guard.
    pub is_active: Option<bool>,
}

/// Company as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    /// Company ID; send it as `x-company-id`.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Accepts requests.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<companies::Model> for CompanyResponse {
    fn from(c: companies::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// GET `/companies` - List companies.
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(ListQuery),
    responses((status = 200, description = "Paged companies", body = [CompanyResponse])),
    tag = "companies",
    security(("bearer_auth" = []))
)]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(list): Query<ListQuery>,
) -> Result<ApiResponse<PagedList<CompanyResponse>>, ApiError> {
    let page = CompanyRepository::new((*state.db).clone())
        .list(&list.filter(), &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Companies retrieved",
        page.map(CompanyResponse::from),
    ))
}

/// POST `/companies` - Create a company.
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already taken")
    ),
    tag = "companies",
    security(("bearer_auth" = []))
)]
pub async fn create_company(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCompanyRequest>,
) -> Result<ApiResponse<CompanyResponse>, ApiError> {
    let company = CompanyRepository::new((*state.db).clone())
        .create(CreateCompanyInput {
            name: payload.name,
            description: payload.description,
            is_active: payload.is_active,
        })
        .await?;
    Ok(ApiResponse::created("Company created", company.into()))
}

/// GET `/companies/{id}` - Get a company.
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = CompanyResponse),
        (status = 404, description = "Company not found")
    ),
    tag = "companies",
    security(("bearer_auth" = []))
)]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<CompanyResponse>, ApiError> {
    let company = CompanyRepository::new((*state.db).clone()).find(id).await?;
    Ok(ApiResponse::ok("Company retrieved", company.into()))
}

/// PATCH `/companies/{id}` - Update a company.
#[utoipa::path(
    patch,
    path = "/api/v1/companies/{id}",
    request_body = UpdateCompanyRequest,
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company updated", body = CompanyResponse),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Name already taken")
    ),
    tag = "companies",
    security(("bearer_auth" = []))
)]
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCompanyRequest>,
) -> Result<ApiResponse<CompanyResponse>, ApiError> {
    let company = CompanyRepository::new((*state.db).clone())
        .update(
            id,
            UpdateCompanyInput {
                name: payload.name,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Company updated", company.into()))
}

/// DELETE `/companies/{id}` - Delete a company.
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Company still owns records")
    ),
    tag = "companies",
    security(("bearer_auth" = []))
)]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    CompanyRepository::new((*state.db).clone()).delete(id).await?;
    Ok(ApiResponse::ok("Company deleted", ()))
}
