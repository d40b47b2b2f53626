//! Customer routes.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tally_db::{CreateCustomerInput, CustomerRepository, UpdateCustomerInput, entities::customers};
use tally_shared::PagedList;
use utoipa::ToSchema;
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

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    /// Name, unique within the company.
    #[validate(length(min = 1, max = 150, message = "name must be 1-150 characters"))]
    pub name: String,
    /// Phone number.
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for updating a customer.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    /// New name.
    #[validate(length(min = 1, max = 150, message = "name must be 1-150 characters"))]
    pub name: Option<String>,
    /// New phone; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 30))]
    pub phone: Option<Option<String>>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
}

/// Customer as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    /// Customer ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Name.
    pub name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Free text.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<customers::Model> for CustomerResponse {
    fn from(c: customers::Model) -> Self {
        Self {
            id: c.id,
            company_id: c.company_id,
            name: c.name,
            phone: c.phone,
            description: c.description,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// GET `/customers` - List customers.
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    params(ListQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Paged customers", body = [CustomerResponse])),
    tag = "customers",
    security(("bearer_auth" = []))
)]
pub async fn list_customers(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
) -> Result<ApiResponse<PagedList<CustomerResponse>>, ApiError> {
    let page = CustomerRepository::new((*state.db).clone())
        .list(tenant.id(), &list.filter(), &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Customers retrieved",
        page.map(CustomerResponse::from),
    ))
}

/// POST `/customers` - Create a customer.
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already used in this company")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
pub async fn create_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateCustomerRequest>,
) -> Result<ApiResponse<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .create(CreateCustomerInput {
            company_id: tenant.id(),
            name: payload.name,
            phone: payload.phone,
            description: payload.description,
        })
        .await?;
    Ok(ApiResponse::created("Customer created", customer.into()))
}

/// GET `/customers/{id}` - Get a customer.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Customer", body = CustomerResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
pub async fn get_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Customer retrieved", customer.into()))
}

/// PATCH `/customers/{id}` - Update a customer.
#[utoipa::path(
    patch,
    path = "/api/v1/customers/{id}",
    request_body = UpdateCustomerRequest,
    params(("id" = Uuid, Path, description = "Customer ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Name already used in this company")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
pub async fn update_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerRequest>,
) -> Result<ApiResponse<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateCustomerInput {
                name: payload.name,
                phone: payload.phone,
                description: payload.description,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Customer updated", customer.into()))
}

/// DELETE `/customers/{id}` - Delete a customer.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Still referenced by incomes or payments")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    CustomerRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Customer deleted", ()))
}
