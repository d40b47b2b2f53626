//! OpenAPI document generated from handler and DTO annotations.

use axum::{Json, Router, routing::get};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{AppState, error::ErrorBody, routes};

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// The Tally API description.
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::auth::register,
        routes::auth::login,
        routes::auth::me,
        routes::users::list_users,
        routes::users::get_user,
        routes::users::update_user,
        routes::users::delete_user,
        routes::companies::list_companies,
        routes::companies::create_company,
        routes::companies::get_company,
        routes::companies::update_company,
        routes::companies::delete_company,
        routes::categories::list_categories,
        routes::categories::create_category,
        routes::categories::get_category,
        routes::categories::update_category,
        routes::categories::delete_category,
        routes::customers::list_customers,
        routes::customers::create_customer,
        routes::customers::get_customer,
        routes::customers::update_customer,
        routes::customers::delete_customer,
        routes::employees::list_employees,
        routes::employees::create_employee,
        routes::employees::get_employee,
        routes::employees::update_employee,
        routes::employees::delete_employee,
        routes::vehicles::list_vehicles,
        routes::vehicles::create_vehicle,
        routes::vehicles::get_vehicle,
        routes::vehicles::update_vehicle,
        routes::vehicles::delete_vehicle,
        routes::expenses::list_expenses,
        routes::expenses::export_expenses,
        routes::expenses::create_expense,
        routes::expenses::get_expense,
        routes::expenses::update_expense,
        routes::expenses::delete_expense,
        routes::incomes::list_incomes,
        routes::incomes::export_incomes,
        routes::incomes::create_income,
        routes::incomes::get_income,
        routes::incomes::update_income,
        routes::incomes::delete_income,
        routes::fuels::list_fuels,
        routes::fuels::export_fuels,
        routes::fuels::create_fuel,
        routes::fuels::get_fuel,
        routes::fuels::update_fuel,
        routes::fuels::delete_fuel,
        routes::payments::list_payments,
        routes::payments::export_payments,
        routes::payments::create_payment,
        routes::payments::get_payment,
        routes::payments::update_payment,
        routes::payments::delete_payment,
        routes::reports::monthly_report,
        routes::reports::export_monthly_report,
        routes::reports::customer_report,
        routes::reports::export_customer_report,
        routes::reports::expense_category_report,
        routes::reports::income_category_report,
        routes::reports::summary_report,
    ),
    components(schemas(ErrorBody)),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service status"),
        (name = "auth", description = "Registration, login and the current user"),
        (name = "users", description = "User administration"),
        (name = "companies", description = "Tenants"),
        (name = "categories", description = "Income and expense categories"),
        (name = "customers", description = "Customers"),
        (name = "employees", description = "Employees"),
        (name = "vehicles", description = "Vehicles"),
        (name = "expenses", description = "Expenses with vehicle or employee relations"),
        (name = "incomes", description = "Invoiced income"),
        (name = "fuels", description = "Fuel purchases"),
        (name = "payments", description = "Customer payments"),
        (name = "reports", description = "Aggregated reports and exports"),
    ),
    info(
        title = "Tally API",
        description = "Multi-tenant bookkeeping for small businesses. Tenant-scoped routes require the `x-company-id` header."
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves the document at `/docs/openapi.json`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/docs/openapi.json", get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_tenant_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/expense/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/reports/monthly/export"));

        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
