//! Fuel purchase routes.

use axum::{Router, extract::State, response::Response, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::{
    CreateFuelInput, FuelFilter, FuelRepository, UpdateFuelInput, entities::fuels,
};
use tally_shared::PagedList;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    export::{fuel_sheet, xlsx_attachment},
    extractors::{Path, Query, ValidatedJson},
    middleware::Tenant,
    query::{ListQuery, RangeQuery, double_option},
    response::ApiResponse,
};

/// Creates the fuel routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fuels", get(list_fuels).post(create_fuel))
        .route("/fuels/export", get(export_fuels))
        .route(
            "/fuels/{id}",
            get(get_fuel).patch(update_fuel).delete(delete_fuel),
        )
}

/// Fuel-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FuelQuery {
    /// Only this vehicle's purchases.
    pub vehicle_id: Option<Uuid>,
}

/// Request body for recording a fuel purchase.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFuelRequest {
    /// Fuelled vehicle.
    pub vehicle_id: Uuid,
    /// Total price paid.
    #[schema(value_type = String, example = "1250.00")]
    pub total_price: Decimal,
    /// Invoice number.
    #[validate(length(max = 50))]
    pub invoice_number: Option<String>,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// `YYYY-MM-DD`.
    pub operation_date: NaiveDate,
    /// Driver at the pump.
    #[validate(length(max = 150))]
    pub driver_name: Option<String>,
}

/// Request body for updating a fuel purchase.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFuelRequest {
    /// New vehicle.
    pub vehicle_id: Option<Uuid>,
    /// New total price.
    #[schema(value_type = Option<String>)]
    pub total_price: Option<Decimal>,
    /// New invoice number.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub invoice_number: Option<Option<String>>,
    /// New description.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New driver name.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 150))]
    pub driver_name: Option<Option<String>>,
}

/// Fuel purchase as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FuelResponse {
    /// Fuel record ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Fuelled vehicle.
    pub vehicle_id: Uuid,
    /// Total price paid.
    #[schema(value_type = String)]
    pub total_price: Decimal,
    /// Invoice number.
    pub invoice_number: Option<String>,
    /// Free text.
    pub description: Option<String>,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Driver at the pump.
    pub driver_name: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<fuels::Model> for FuelResponse {
    fn from(f: fuels::Model) -> Self {
        Self {
            id: f.id,
            company_id: f.company_id,
            vehicle_id: f.vehicle_id,
            total_price: f.total_price,
            invoice_number: f.invoice_number,
            description: f.description,
            operation_date: f.operation_date,
            driver_name: f.driver_name,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// GET `/fuels` - List fuel purchases in a date range.
#[utoipa::path(
    get,
    path = "/api/v1/fuels",
    params(ListQuery, RangeQuery, FuelQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Paged fuel purchases, newest first", body = [FuelResponse])),
    tag = "fuels",
    security(("bearer_auth" = []))
)]
pub async fn list_fuels(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<FuelQuery>,
) -> Result<ApiResponse<PagedList<FuelResponse>>, ApiError> {
    let filter = FuelFilter {
        vehicle_id: query.vehicle_id,
    };
    let page = FuelRepository::new((*state.db).clone())
        .list(tenant.id(), &list.dated(&range)?, &filter, &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Fuel records retrieved",
        page.map(FuelResponse::from),
    ))
}

/// GET `/fuels/export` - Download matching fuel purchases as xlsx.
#[utoipa::path(
    get,
    path = "/api/v1/fuels/export",
    params(ListQuery, RangeQuery, FuelQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Spreadsheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    tag = "fuels",
    security(("bearer_auth" = []))
)]
pub async fn export_fuels(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<FuelQuery>,
) -> Result<Response, ApiError> {
    let filter = FuelFilter {
        vehicle_id: query.vehicle_id,
    };
    let rows = FuelRepository::new((*state.db).clone())
        .list_all(tenant.id(), &list.dated(&range)?, &filter)
        .await?;

    let range = range.resolve()?;
    xlsx_attachment(&fuel_sheet(&rows, &range), "fuels", &range)
}

/// POST `/fuels` - Record a fuel purchase.
#[utoipa::path(
    post,
    path = "/api/v1/fuels",
    request_body = CreateFuelRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Fuel record created", body = FuelResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Vehicle not found in this company")
    ),
    tag = "fuels",
    security(("bearer_auth" = []))
)]
pub async fn create_fuel(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateFuelRequest>,
) -> Result<ApiResponse<FuelResponse>, ApiError> {
    let fuel = FuelRepository::new((*state.db).clone())
        .create(CreateFuelInput {
            company_id: tenant.id(),
            vehicle_id: payload.vehicle_id,
            total_price: payload.total_price,
            invoice_number: payload.invoice_number,
            description: payload.description,
            operation_date: payload.operation_date,
            driver_name: payload.driver_name,
        })
        .await?;
    Ok(ApiResponse::created("Fuel record created", fuel.into()))
}

/// GET `/fuels/{id}` - Get a fuel purchase.
#[utoipa::path(
    get,
    path = "/api/v1/fuels/{id}",
    params(("id" = Uuid, Path, description = "Fuel record ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Fuel record", body = FuelResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "fuels",
    security(("bearer_auth" = []))
)]
pub async fn get_fuel(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<FuelResponse>, ApiError> {
    let fuel = FuelRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Fuel record retrieved", fuel.into()))
}

/// PATCH `/fuels/{id}` - Update a fuel purchase.
#[utoipa::path(
    patch,
    path = "/api/v1/fuels/{id}",
    request_body = UpdateFuelRequest,
    params(("id" = Uuid, Path, description = "Fuel record ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Fuel record updated", body = FuelResponse),
        (status = 404, description = "Fuel record or vehicle not found in this company")
    ),
    tag = "fuels",
    security(("bearer_auth" = []))
)]
pub async fn update_fuel(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateFuelRequest>,
) -> Result<ApiResponse<FuelResponse>, ApiError> {
    let fuel = FuelRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateFuelInput {
                vehicle_id: payload.vehicle_id,
                total_price: payload.total_price,
                invoice_number: payload.invoice_number,
                description: payload.description,
                operation_date: payload.operation_date,
                driver_name: payload.driver_name,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Fuel record updated", fuel.into()))
}

/// DELETE `/fuels/{id}` - Delete a fuel purchase.
#[utoipa::path(
    delete,
    path = "/api/v1/fuels/{id}",
    params(("id" = Uuid, Path, description = "Fuel record ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Fuel record deleted"),
        (status = 404, description = "Not found in this company")
    ),
    tag = "fuels",
    security(("bearer_auth" = []))
)]
pub async fn delete_fuel(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    FuelRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Fuel record deleted", ()))
}
