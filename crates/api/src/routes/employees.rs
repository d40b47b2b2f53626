//! Employee routes.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::{
    CreateEmployeeInput, EmployeeFilter, EmployeeRepository, UpdateEmployeeInput,
    entities::employees,
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

/// Creates the employee routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
}

/// Employee-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Only active (or inactive) employees.
    pub is_active: Option<bool>,
}

/// Request body for creating an employee.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    /// Full name, unique within the company.
    #[validate(length(min = 1, max = 150, message = "fullName must be 1-150 characters"))]
    pub full_name: String,
    /// Phone number.
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    /// Department.
    #[validate(length(max = 100))]
    pub department: Option<String>,
    /// `YYYY-MM-DD`.
    pub hire_date: Option<NaiveDate>,
    /// `YYYY-MM-DD`, not before `hireDate`.
    pub termination_date: Option<NaiveDate>,
    /// Monthly salary as a decimal string.
    #[schema(value_type = Option<String>, example = "25000.00")]
    pub salary: Option<Decimal>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Request body for updating an employee.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    /// New full name.
    #[validate(length(min = 1, max = 150, message = "fullName must be 1-150 characters"))]
    pub full_name: Option<String>,
    /// New phone; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 30))]
    pub phone: Option<Option<String>>,
    /// New department.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub department: Option<Option<String>>,
    /// New hire date.
    #[serde(default, deserialize_with = "double_option")]
    pub hire_date: Option<Option<NaiveDate>>,
    /// New termination date.
    #[serde(default, deserialize_with = "double_option")]
    pub termination_date: Option<Option<NaiveDate>>,
    /// New salary.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub salary: Option<Option<Decimal>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Employee as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    /// Employee ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Hire date.
    pub hire_date: Option<NaiveDate>,
    /// Termination date.
    pub termination_date: Option<NaiveDate>,
    /// Monthly salary.
    #[schema(value_type = Option<String>)]
    pub salary: Option<Decimal>,
    /// Currently employed.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<employees::Model> for EmployeeResponse {
    fn from(e: employees::Model) -> Self {
        Self {
            id: e.id,
            company_id: e.company_id,
            full_name: e.full_name,
            phone: e.phone,
            department: e.department,
            hire_date: e.hire_date,
            termination_date: e.termination_date,
            salary: e.salary,
            is_active: e.is_active,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// GET `/employees` - List employees.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(ListQuery, EmployeeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Paged employees", body = [EmployeeResponse])),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(query): Query<EmployeeQuery>,
) -> Result<ApiResponse<PagedList<EmployeeResponse>>, ApiError> {
    let filter = EmployeeFilter {
        is_active: query.is_active,
    };
    let page = EmployeeRepository::new((*state.db).clone())
        .list(tenant.id(), &list.filter(), &filter, &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Employees retrieved",
        page.map(EmployeeResponse::from),
    ))
}

/// POST `/employees` - Create an employee.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Full name already used in this company")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateEmployeeRequest>,
) -> Result<ApiResponse<EmployeeResponse>, ApiError> {
    let employee = EmployeeRepository::new((*state.db).clone())
        .create(CreateEmployeeInput {
            company_id: tenant.id(),
            full_name: payload.full_name,
            phone: payload.phone,
            department: payload.department,
            hire_date: payload.hire_date,
            termination_date: payload.termination_date,
            salary: payload.salary,
            is_active: payload.is_active,
        })
        .await?;
    Ok(ApiResponse::created("Employee created", employee.into()))
}

/// GET `/employees/{id}` - Get an employee.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Employee", body = EmployeeResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<EmployeeResponse>, ApiError> {
    let employee = EmployeeRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Employee retrieved", employee.into()))
}

/// PATCH `/employees/{id}` - Update an employee.
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{id}",
    request_body = UpdateEmployeeRequest,
    params(("id" = Uuid, Path, description = "Employee ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Termination before hire"),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Full name already used in this company")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateEmployeeRequest>,
) -> Result<ApiResponse<EmployeeResponse>, ApiError> {
    let employee = EmployeeRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateEmployeeInput {
                full_name: payload.full_name,
                phone: payload.phone,
                department: payload.department,
                hire_date: payload.hire_date,
                termination_date: payload.termination_date,
                salary: payload.salary,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Employee updated", employee.into()))
}

/// DELETE `/employees/{id}` - Delete an employee.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Still assigned as a vehicle driver")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    EmployeeRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Employee deleted", ()))
}
