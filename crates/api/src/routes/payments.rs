//! Customer payment routes.

use axum::{Router, extract::State, response::Response, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::{
    CreatePaymentInput, PaymentFilter, PaymentRepository, UpdatePaymentInput, entities::payments,
};
use tally_shared::PagedList;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    export::{payment_sheet, xlsx_attachment},
    extractors::{Path, Query, ValidatedJson},
    middleware::Tenant,
    query::{ListQuery, RangeQuery, double_option},
    response::ApiResponse,
};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/export", get(export_payments))
        .route(
            "/payments/{id}",
            get(get_payment)
                .patch(update_payment)
                .delete(delete_payment),
        )
}

/// Payment-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    /// Only this customer's payments.
    pub customer_id: Option<Uuid>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Paying customer.
    pub customer_id: Uuid,
    /// Amount received.
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,
    /// `YYYY-MM-DD`.
    pub operation_date: NaiveDate,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for updating a payment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    /// New customer.
    pub customer_id: Option<Uuid>,
    /// New amount.
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
}

/// Payment as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Paying customer.
    pub customer_id: Uuid,
    /// Amount received.
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(p: payments::Model) -> Self {
        Self {
            id: p.id,
            company_id: p.company_id,
            customer_id: p.customer_id,
            amount: p.amount,
            operation_date: p.operation_date,
            description: p.description,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// GET `/payments` - List payments in a date range.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(ListQuery, RangeQuery, PaymentQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Paged payments, newest first", body = [PaymentResponse])),
    tag = "payments",
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<PaymentQuery>,
) -> Result<ApiResponse<PagedList<PaymentResponse>>, ApiError> {
    let filter = PaymentFilter {
        customer_id: query.customer_id,
    };
    let page = PaymentRepository::new((*state.db).clone())
        .list(tenant.id(), &list.dated(&range)?, &filter, &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Payments retrieved",
        page.map(PaymentResponse::from),
    ))
}

/// GET `/payments/export` - Download matching payments as xlsx.
#[utoipa::path(
    get,
    path = "/api/v1/payments/export",
    params(ListQuery, RangeQuery, PaymentQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Spreadsheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    tag = "payments",
    security(("bearer_auth" = []))
)]
pub async fn export_payments(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<PaymentQuery>,
) -> Result<Response, ApiError> {
    let filter = PaymentFilter {
        customer_id: query.customer_id,
    };
    let rows = PaymentRepository::new((*state.db).clone())
        .list_all(tenant.id(), &list.dated(&range)?, &filter)
        .await?;

    let range = range.resolve()?;
    xlsx_attachment(&payment_sheet(&rows, &range), "payments", &range)
}

/// POST `/payments` - Record a payment.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreatePaymentRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Payment created", body = PaymentResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Customer not found in this company")
    ),
    tag = "payments",
    security(("bearer_auth" = []))
)]
pub async fn create_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> Result<ApiResponse<PaymentResponse>, ApiError> {
    let payment = PaymentRepository::new((*state.db).clone())
        .create(CreatePaymentInput {
            company_id: tenant.id(),
            customer_id: payload.customer_id,
            amount: payload.amount,
            operation_date: payload.operation_date,
            description: payload.description,
        })
        .await?;
    Ok(ApiResponse::created("Payment created", payment.into()))
}

/// GET `/payments/{id}` - Get a payment.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Payment", body = PaymentResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "payments",
    security(("bearer_auth" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<PaymentResponse>, ApiError> {
    let payment = PaymentRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Payment retrieved", payment.into()))
}

/// PATCH `/payments/{id}` - Update a payment.
#[utoipa::path(
    patch,
    path = "/api/v1/payments/{id}",
    request_body = UpdatePaymentRequest,
    params(("id" = Uuid, Path, description = "Payment ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Payment updated", body = PaymentResponse),
        (status = 404, description = "Payment or customer not found in this company")
    ),
    tag = "payments",
    security(("bearer_auth" = []))
)]
pub async fn update_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePaymentRequest>,
) -> Result<ApiResponse<PaymentResponse>, ApiError> {
    let payment = PaymentRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdatePaymentInput {
                customer_id: payload.customer_id,
                amount: payload.amount,
                operation_date: payload.operation_date,
                description: payload.description,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Payment updated", payment.into()))
}

/// DELETE `/payments/{id}` - Delete a payment.
#[utoipa::path(
    delete,
    path = "/api/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Payment deleted"),
        (status = 404, description = "Not found in this company")
    ),
    tag = "payments",
    security(("bearer_auth" = []))
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    PaymentRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Payment deleted", ()))
}
