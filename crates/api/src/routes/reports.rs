//! Report routes: monthly profit and loss, customer receivables, category
//! breakdowns and a range summary.

use axum::{Router, extract::State, response::Response, routing::get};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tally_core::export::{customer_report_sheet, monthly_report_sheet};
use tally_core::listing::DateRange;
use tally_core::records::CategoryType;
use tally_core::reports::{CategoryReport, CustomerReport, MonthlyReport, SummaryReport};
use tally_db::ReportRepository;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    export::xlsx_attachment,
    extractors::Query,
    middleware::Tenant,
    query::RangeQuery,
    response::ApiResponse,
};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/monthly", get(monthly_report))
        .route("/reports/monthly/export", get(export_monthly_report))
        .route("/reports/customers", get(customer_report))
        .route("/reports/customers/export", get(export_customer_report))
        .route("/reports/expense-categories", get(expense_category_report))
        .route("/reports/income-categories", get(income_category_report))
        .route("/reports/summary", get(summary_report))
}

/// Year selector for the monthly report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// Calendar year; defaults to the current one.
    pub year: Option<i32>,
}

impl YearQuery {
    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

async fn load_monthly(
    state: &AppState,
    tenant: Tenant,
    query: &YearQuery,
) -> Result<MonthlyReport, ApiError> {
    Ok(ReportRepository::new((*state.db).clone())
        .monthly(tenant.id(), query.year(), state.report_locale)
        .await?)
}

/// GET `/reports/monthly` - Twelve-month profit and loss.
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly",
    params(YearQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Twelve monthly entries and yearly totals", body = MonthlyReport),
        (status = 400, description = "Unsupported year")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn monthly_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<YearQuery>,
) -> Result<ApiResponse<MonthlyReport>, ApiError> {
    let report = load_monthly(&state, tenant, &query).await?;
    Ok(ApiResponse::ok("Monthly report generated", report))
}

/// GET `/reports/monthly/export` - Monthly report as xlsx.
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly/export",
    params(YearQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Spreadsheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn export_monthly_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<YearQuery>,
) -> Result<Response, ApiError> {
    let report = load_monthly(&state, tenant, &query).await?;
    let range = DateRange::year(report.year)?;
    xlsx_attachment(&monthly_report_sheet(&report), "monthly-report", &range)
}

/// GET `/reports/customers` - Per-customer income, payments and receivables.
#[utoipa::path(
    get,
    path = "/api/v1/reports/customers",
    params(RangeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Customers by total income, descending", body = CustomerReport),
        (status = 400, description = "beginDate after endDate")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn customer_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(range): Query<RangeQuery>,
) -> Result<ApiResponse<CustomerReport>, ApiError> {
    let report = ReportRepository::new((*state.db).clone())
        .customers(tenant.id(), range.resolve()?)
        .await?;
    Ok(ApiResponse::ok("Customer report generated", report))
}

/// GET `/reports/customers/export` - Customer report as xlsx; fully paid customers are highlighted.
#[utoipa::path(
    get,
    path = "/api/v1/reports/customers/export",
    params(RangeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Spreadsheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn export_customer_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(range): Query<RangeQuery>,
) -> Result<Response, ApiError> {
    let range = range.resolve()?;
    let report = ReportRepository::new((*state.db).clone())
        .customers(tenant.id(), range)
        .await?;
    xlsx_attachment(&customer_report_sheet(&report), "customer-report", &range)
}

/// GET `/reports/expense-categories` - Expense totals per category.
#[utoipa::path(
    get,
    path = "/api/v1/reports/expense-categories",
    params(RangeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Categories by total, descending", body = CategoryReport)),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn expense_category_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(range): Query<RangeQuery>,
) -> Result<ApiResponse<CategoryReport>, ApiError> {
    let report = ReportRepository::new((*state.db).clone())
        .categories(tenant.id(), CategoryType::Expense, range.resolve()?)
        .await?;
    Ok(ApiResponse::ok("Expense category report generated", report))
}

/// GET `/reports/income-categories` - Income totals per category.
#[utoipa::path(
    get,
    path = "/api/v1/reports/income-categories",
    params(RangeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Categories by total, descending", body = CategoryReport)),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn income_category_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(range): Query<RangeQuery>,
) -> Result<ApiResponse<CategoryReport>, ApiError> {
    let report = ReportRepository::new((*state.db).clone())
        .categories(tenant.id(), CategoryType::Income, range.resolve()?)
        .await?;
    Ok(ApiResponse::ok("Income category report generated", report))
}

/// GET `/reports/summary` - Totals and profit for a date range.
#[utoipa::path(
    get,
    path = "/api/v1/reports/summary",
    params(RangeQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Range totals", body = SummaryReport)),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn summary_report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(range): Query<RangeQuery>,
) -> Result<ApiResponse<SummaryReport>, ApiError> {
    let report = ReportRepository::new((*state.db).clone())
        .summary(tenant.id(), range.resolve()?)
        .await?;
    Ok(ApiResponse::ok("Summary report generated", report))
}
