//! Income routes.

use axum::{Router, extract::State, response::Response, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::{
    CategoryRepository, CreateIncomeInput, CustomerRepository, IncomeFilter, IncomeRepository,
    UpdateIncomeInput, entities::incomes,
};
use tally_shared::PagedList;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    export::{income_sheet, xlsx_attachment},
    extractors::{Path, Query, ValidatedJson},
    middleware::Tenant,
    query::{ListQuery, RangeQuery, double_option},
    response::ApiResponse,
};

/// Creates the income routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/incomes", get(list_incomes).post(create_income))
        .route("/incomes/export", get(export_incomes))
        .route(
            "/incomes/{id}",
            get(get_income).patch(update_income).delete(delete_income),
        )
}

/// Income-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IncomeQuery {
    /// Only this customer's incomes.
    pub customer_id: Option<Uuid>,
    /// Only incomes of this category.
    pub category_id: Option<Uuid>,
    /// Only paid (or unpaid) incomes.
    pub is_paid: Option<bool>,
}

impl IncomeQuery {
    const fn filter(&self) -> IncomeFilter {
        IncomeFilter {
            customer_id: self.customer_id,
            category_id: self.category_id,
            is_paid: self.is_paid,
        }
    }
}

/// Request body for creating an income.
///
/// `totalAmount` is not accepted; it is computed as `unitCount × unitPrice`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncomeRequest {
    /// Billed customer.
    pub customer_id: Uuid,
    /// An `income` category.
    pub category_id: Uuid,
    /// Quantity.
    #[schema(value_type = String, example = "3")]
    pub unit_count: Decimal,
    /// Price per unit.
    #[schema(value_type = String, example = "50.25")]
    pub unit_price: Decimal,
    /// `YYYY-MM-DD`.
    pub operation_date: NaiveDate,
    /// Defaults to `false`.
    #[serde(default)]
    pub is_paid: bool,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for updating an income.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncomeRequest {
    /// New customer.
    pub customer_id: Option<Uuid>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New quantity; the total is recomputed.
    #[schema(value_type = Option<String>)]
    pub unit_count: Option<Decimal>,
    /// New unit price; the total is recomputed.
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New paid flag.
    pub is_paid: Option<bool>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
}

/// Income as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeResponse {
    /// Income ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Billed customer.
    pub customer_id: Uuid,
    /// Category.
    pub category_id: Uuid,
    /// Quantity.
    #[schema(value_type = String)]
    pub unit_count: Decimal,
    /// Price per unit.
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    /// `unitCount × unitPrice`.
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Paid flag.
    pub is_paid: bool,
    /// Free text.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<incomes::Model> for IncomeResponse {
    fn from(i: incomes::Model) -> Self {
        Self {
            id: i.id,
            company_id: i.company_id,
            customer_id: i.customer_id,
            category_id: i.category_id,
            unit_count: i.unit_count,
            unit_price: i.unit_price,
            total_amount: i.total_amount,
            operation_date: i.operation_date,
            is_paid: i.is_paid,
            description: i.description,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// GET `/incomes` - List incomes in a date range.
#[utoipa::path(
    get,
    path = "/api/v1/incomes",
    params(ListQuery, RangeQuery, IncomeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Paged incomes, newest first", body = [IncomeResponse]),
        (status = 400, description = "beginDate after endDate")
    ),
    tag = "incomes",
    security(("bearer_auth" = []))
)]
pub async fn list_incomes(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<IncomeQuery>,
) -> Result<ApiResponse<PagedList<IncomeResponse>>, ApiError> {
    let page = IncomeRepository::new((*state.db).clone())
        .list(
            tenant.id(),
            &list.dated(&range)?,
            &query.filter(),
            &list.page(),
        )
        .await?;
    Ok(ApiResponse::ok(
        "Incomes retrieved",
        page.map(IncomeResponse::from),
    ))
}

/// GET `/incomes/export` - Download matching incomes as xlsx; paid rows are highlighted.
#[utoipa::path(
    get,
    path = "/api/v1/incomes/export",
    params(ListQuery, RangeQuery, IncomeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Spreadsheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    tag = "incomes",
    security(("bearer_auth" = []))
)]
pub async fn export_incomes(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<IncomeQuery>,
) -> Result<Response, ApiError> {
    let filter = list.dated(&range)?;
    let rows = IncomeRepository::new((*state.db).clone())
        .list_all(tenant.id(), &filter, &query.filter())
        .await?;

    let customer_ids = rows.iter().map(|i| i.customer_id).collect();
    let category_ids = rows.iter().map(|i| i.category_id).collect();
    let customer_repo = CustomerRepository::new((*state.db).clone());
    let category_repo = CategoryRepository::new((*state.db).clone());
    let (customers, categories) = tokio::try_join!(
        customer_repo.names(tenant.id(), customer_ids),
        category_repo.names(tenant.id(), category_ids),
    )?;

    let range = range.resolve()?;
    xlsx_attachment(
        &income_sheet(&rows, &customers, &categories, &range),
        "incomes",
        &range,
    )
}

/// POST `/incomes` - Create an income.
#[utoipa::path(
    post,
    path = "/api/v1/incomes",
    request_body = CreateIncomeRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Income created", body = IncomeResponse),
        (status = 400, description = "Invalid input or category kind"),
        (status = 404, description = "Customer or category not found in this company")
    ),
    tag = "incomes",
    security(("bearer_auth" = []))
)]
pub async fn create_income(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateIncomeRequest>,
) -> Result<ApiResponse<IncomeResponse>, ApiError> {
    let income = IncomeRepository::new((*state.db).clone())
        .create(CreateIncomeInput {
            company_id: tenant.id(),
            customer_id: payload.customer_id,
            category_id: payload.category_id,
            unit_count: payload.unit_count,
            unit_price: payload.unit_price,
            operation_date: payload.operation_date,
            is_paid: payload.is_paid,
            description: payload.description,
        })
        .await?;
    Ok(ApiResponse::created("Income created", income.into()))
}

/// GET `/incomes/{id}` - Get an income.
#[utoipa::path(
    get,
    path = "/api/v1/incomes/{id}",
    params(("id" = Uuid, Path, description = "Income ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Income", body = IncomeResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "incomes",
    security(("bearer_auth" = []))
)]
pub async fn get_income(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<IncomeResponse>, ApiError> {
    let income = IncomeRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Income retrieved", income.into()))
}

/// PATCH `/incomes/{id}` - Update an income.
#[utoipa::path(
    patch,
    path = "/api/v1/incomes/{id}",
    request_body = UpdateIncomeRequest,
    params(("id" = Uuid, Path, description = "Income ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Income updated", body = IncomeResponse),
        (status = 400, description = "Invalid input or category kind"),
        (status = 404, description = "Income or referenced record not found in this company")
    ),
    tag = "incomes",
    security(("bearer_auth" = []))
)]
pub async fn update_income(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateIncomeRequest>,
) -> Result<ApiResponse<IncomeResponse>, ApiError> {
    let income = IncomeRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateIncomeInput {
                customer_id: payload.customer_id,
                category_id: payload.category_id,
                unit_count: payload.unit_count,
                unit_price: payload.unit_price,
                operation_date: payload.operation_date,
                is_paid: payload.is_paid,
                description: payload.description,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Income updated", income.into()))
}

/// DELETE `/incomes/{id}` - Delete an income.
#[utoipa::path(
    delete,
    path = "/api/v1/incomes/{id}",
    params(("id" = Uuid, Path, description = "Income ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Income deleted"),
        (status = 404, description = "Not found in this company")
    ),
    tag = "incomes",
    security(("bearer_auth" = []))
)]
pub async fn delete_income(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    IncomeRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Income deleted", ()))
}
