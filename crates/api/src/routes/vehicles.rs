//! Vehicle routes.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tally_db::{
    CreateVehicleInput, UpdateVehicleInput, VehicleFilter, VehicleRepository, entities::vehicles,
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

/// Creates the vehicle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/{id}",
            get(get_vehicle)
                .patch(update_vehicle)
                .delete(delete_vehicle),
        )
}

/// Vehicle-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VehicleQuery {
    /// Only vehicles in (or out of) service.
    pub is_active: Option<bool>,
}

/// Request body for creating a vehicle.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    /// Licence plate; stored trimmed and upper-cased.
    #[validate(length(min = 1, max = 20, message = "plateNumber must be 1-20 characters"))]
    pub plate_number: String,
    /// Make.
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    /// Model.
    #[validate(length(max = 50))]
    pub model: Option<String>,
    /// Next inspection.
    pub inspection_date: Option<NaiveDate>,
    /// Insurance renewal.
    pub insurance_date: Option<NaiveDate>,
    /// Employee driving the vehicle.
    pub driver_id: Option<Uuid>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Request body for updating a vehicle.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    /// New plate.
    #[validate(length(min = 1, max = 20, message = "plateNumber must be 1-20 characters"))]
    pub plate_number: Option<String>,
    /// New make.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub brand: Option<Option<String>>,
    /// New model.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub model: Option<Option<String>>,
    /// New inspection date.
    #[serde(default, deserialize_with = "double_option")]
    pub inspection_date: Option<Option<NaiveDate>>,
    /// New insurance date.
    #[serde(default, deserialize_with = "double_option")]
    pub insurance_date: Option<Option<NaiveDate>>,
    /// New driver; `null` unassigns.
    #[serde(default, deserialize_with = "double_option")]
    pub driver_id: Option<Option<Uuid>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Vehicle as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    /// Vehicle ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Licence plate.
    pub plate_number: String,
    /// Make.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Next inspection.
    pub inspection_date: Option<NaiveDate>,
    /// Insurance renewal.
    pub insurance_date: Option<NaiveDate>,
    /// Assigned driver.
    pub driver_id: Option<Uuid>,
    /// In service.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<vehicles::Model> for VehicleResponse {
    fn from(v: vehicles::Model) -> Self {
        Self {
            id: v.id,
            company_id: v.company_id,
            plate_number: v.plate_number,
            brand: v.brand,
            model: v.model,
            inspection_date: v.inspection_date,
            insurance_date: v.insurance_date,
            driver_id: v.driver_id,
            is_active: v.is_active,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// GET `/vehicles` - List vehicles.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    params(ListQuery, VehicleQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Paged vehicles", body = [VehicleResponse])),
    tag = "vehicles",
    security(("bearer_auth" = []))
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(query): Query<VehicleQuery>,
) -> Result<ApiResponse<PagedList<VehicleResponse>>, ApiError> {
    let filter = VehicleFilter {
        is_active: query.is_active,
    };
    let page = VehicleRepository::new((*state.db).clone())
        .list(tenant.id(), &list.filter(), &filter, &list.page())
        .await?;
    Ok(ApiResponse::ok(
        "Vehicles retrieved",
        page.map(VehicleResponse::from),
    ))
}

/// POST `/vehicles` - Create a vehicle.
#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    request_body = CreateVehicleRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Vehicle created", body = VehicleResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Driver not found in this company"),
        (status = 409, description = "Plate already registered in this company")
    ),
    tag = "vehicles",
    security(("bearer_auth" = []))
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateVehicleRequest>,
) -> Result<ApiResponse<VehicleResponse>, ApiError> {
    let vehicle = VehicleRepository::new((*state.db).clone())
        .create(CreateVehicleInput {
            company_id: tenant.id(),
            plate_number: payload.plate_number,
            brand: payload.brand,
            model: payload.model,
            inspection_date: payload.inspection_date,
            insurance_date: payload.insurance_date,
            driver_id: payload.driver_id,
            is_active: payload.is_active,
        })
        .await?;
    Ok(ApiResponse::created("Vehicle created", vehicle.into()))
}

/// GET `/vehicles/{id}` - Get a vehicle.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    params(("id" = Uuid, Path, description = "Vehicle ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Vehicle", body = VehicleResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "vehicles",
    security(("bearer_auth" = []))
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<VehicleResponse>, ApiError> {
    let vehicle = VehicleRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Vehicle retrieved", vehicle.into()))
}

/// PATCH `/vehicles/{id}` - Update a vehicle.
#[utoipa::path(
    patch,
    path = "/api/v1/vehicles/{id}",
    request_body = UpdateVehicleRequest,
    params(("id" = Uuid, Path, description = "Vehicle ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Vehicle updated", body = VehicleResponse),
        (status = 404, description = "Vehicle or driver not found in this company"),
        (status = 409, description = "Plate already registered in this company")
    ),
    tag = "vehicles",
    security(("bearer_auth" = []))
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateVehicleRequest>,
) -> Result<ApiResponse<VehicleResponse>, ApiError> {
    let vehicle = VehicleRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateVehicleInput {
                plate_number: payload.plate_number,
                brand: payload.brand,
                model: payload.model,
                inspection_date: payload.inspection_date,
                insurance_date: payload.insurance_date,
                driver_id: payload.driver_id,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Vehicle updated", vehicle.into()))
}

/// DELETE `/vehicles/{id}` - Delete a vehicle.
#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    params(("id" = Uuid, Path, description = "Vehicle ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Vehicle deleted"),
        (status = 404, description = "Not found in this company"),
        (status = 409, description = "Still referenced by fuel records")
    ),
    tag = "vehicles",
    security(("bearer_auth" = []))
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    VehicleRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Vehicle deleted", ()))
}
