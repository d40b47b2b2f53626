//! Expense routes.
//!
//! An expense may point at a vehicle or an employee through
//! `relatedId`/`relatedModel`; responses carry the resolved projection in
//! `related`.

use axum::{Router, extract::State, response::Response, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::relation::{RelatedEntity, RelatedModel, RelationError, RelationRef};
use tally_db::{
    CategoryRepository, CreateExpenseInput, ExpenseFilter, ExpenseRepository, ExpenseWithRelated,
    UpdateExpenseInput,
};
use tally_shared::PagedList;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    export::{expense_sheet, xlsx_attachment},
    extractors::{Path, Query, ValidatedJson},
    middleware::Tenant,
    query::{ListQuery, RangeQuery, double_option},
    response::ApiResponse,
};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expense", get(list_expenses).post(create_expense))
        .route("/expense/export", get(export_expenses))
        .route(
            "/expense/{id}",
            get(get_expense)
                .patch(update_expense)
                .delete(delete_expense),
        )
}

/// Expense-specific list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    /// Only expenses of this category.
    pub category_id: Option<Uuid>,
    /// Only expenses related to a `Vehicle` or an `Employee`.
    pub related_model: Option<RelatedModel>,
}

impl ExpenseQuery {
    fn filter(&self) -> ExpenseFilter {
        ExpenseFilter {
            category_id: self.category_id,
            related_model: self.related_model.map(Into::into),
        }
    }
}

/// Request body for creating an expense.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// `YYYY-MM-DD`.
    pub operation_date: NaiveDate,
    /// An `expense` category.
    pub category_id: Uuid,
    /// Amount as a decimal string.
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Vehicle or employee id; requires `relatedModel`.
    pub related_id: Option<Uuid>,
    /// `Vehicle` or `Employee`; requires `relatedId`.
    pub related_model: Option<RelatedModel>,
}

/// Request body for updating an expense.
///
/// `relatedId` and `relatedModel` change together; both `null` detaches the
/// relation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New amount.
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,
    /// New related id.
    #[serde(default, deserialize_with = "double_option")]
    pub related_id: Option<Option<Uuid>>,
    /// New related model.
    #[serde(default, deserialize_with = "double_option")]
    pub related_model: Option<Option<RelatedModel>>,
}

impl UpdateExpenseRequest {
    /// Outer `None` leaves the relation alone, `Some(None)` detaches it.
    fn relation(&self) -> Result<Option<Option<RelationRef>>, RelationError> {
        match (self.related_id, self.related_model) {
            (None, None) => Ok(None),
            (Some(id), Some(model)) => RelationRef::from_parts(id, model).map(Some),
            _ => Err(RelationError::Incomplete),
        }
    }
}

/// Expense as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Category.
    pub category_id: Uuid,
    /// Amount.
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Free text.
    pub description: Option<String>,
    /// Related record id, echoed even when the record is gone.
    pub related_id: Option<Uuid>,
    /// Related record kind.
    pub related_model: Option<RelatedModel>,
    /// `{"plateNumber"}` or `{"fullName"}` of the related record.
    pub related: Option<RelatedEntity>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<ExpenseWithRelated> for ExpenseResponse {
    fn from(row: ExpenseWithRelated) -> Self {
        let e = row.expense;
        Self {
            id: e.id,
            company_id: e.company_id,
            operation_date: e.operation_date,
            category_id: e.category_id,
            amount: e.amount,
            description: e.description,
            related_id: e.related_id,
            related_model: e.related_model.map(Into::into),
            related: row.related,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// GET `/expense` - List expenses in a date range.
#[utoipa::path(
    get,
    path = "/api/v1/expense",
    params(ListQuery, RangeQuery, ExpenseQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Paged expenses, newest first", body = [ExpenseResponse]),
        (status = 400, description = "beginDate after endDate")
    ),
    tag = "expenses",
    security(("bearer_auth" = []))
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<ExpenseQuery>,
) -> Result<ApiResponse<PagedList<ExpenseResponse>>, ApiError> {
    let page = ExpenseRepository::new((*state.db).clone())
        .list(
            tenant.id(),
            &list.dated(&range)?,
            &query.filter(),
            &list.page(),
        )
        .await?;
    Ok(ApiResponse::ok(
        "Expenses retrieved",
        page.map(ExpenseResponse::from),
    ))
}

/// GET `/expense/export` - Download matching expenses as xlsx.
#[utoipa::path(
    get,
    path = "/api/v1/expense/export",
    params(ListQuery, RangeQuery, ExpenseQuery, ("x-company-id" = Uuid, Header, description = "Company")),
    responses((status = 200, description = "Spreadsheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    tag = "expenses",
    security(("bearer_auth" = []))
)]
pub async fn export_expenses(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(list): Query<ListQuery>,
    Query(range): Query<RangeQuery>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Response, ApiError> {
    let filter = list.dated(&range)?;
    let rows = ExpenseRepository::new((*state.db).clone())
        .list_all(tenant.id(), &filter, &query.filter())
        .await?;
    let category_ids = rows.iter().map(|r| r.expense.category_id).collect();
    let categories = CategoryRepository::new((*state.db).clone())
        .names(tenant.id(), category_ids)
        .await?;

    let range = range.resolve()?;
    xlsx_attachment(&expense_sheet(&rows, &categories, &range), "expenses", &range)
}

/// POST `/expense` - Create an expense.
#[utoipa::path(
    post,
    path = "/api/v1/expense",
    request_body = CreateExpenseRequest,
    params(("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 400, description = "Invalid input or category kind"),
        (status = 404, description = "Category or related record not found in this company")
    ),
    tag = "expenses",
    security(("bearer_auth" = []))
)]
pub async fn create_expense(
    State(state): State<AppState>,
    tenant: Tenant,
    ValidatedJson(payload): ValidatedJson<CreateExpenseRequest>,
) -> Result<ApiResponse<ExpenseResponse>, ApiError> {
    let related = RelationRef::from_parts(payload.related_id, payload.related_model)?;
    let expense = ExpenseRepository::new((*state.db).clone())
        .create(CreateExpenseInput {
            company_id: tenant.id(),
            operation_date: payload.operation_date,
            category_id: payload.category_id,
            amount: payload.amount,
            description: payload.description,
            related,
        })
        .await?;
    Ok(ApiResponse::created("Expense created", expense.into()))
}

/// GET `/expense/{id}` - Get an expense.
#[utoipa::path(
    get,
    path = "/api/v1/expense/{id}",
    params(("id" = Uuid, Path, description = "Expense ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Expense", body = ExpenseResponse),
        (status = 404, description = "Not found in this company")
    ),
    tag = "expenses",
    security(("bearer_auth" = []))
)]
pub async fn get_expense(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ExpenseResponse>, ApiError> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .find(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Expense retrieved", expense.into()))
}

/// PATCH `/expense/{id}` - Update an expense.
#[utoipa::path(
    patch,
    path = "/api/v1/expense/{id}",
    request_body = UpdateExpenseRequest,
    params(("id" = Uuid, Path, description = "Expense ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Expense updated", body = ExpenseResponse),
        (status = 400, description = "Invalid input or incomplete relation"),
        (status = 404, description = "Expense or referenced record not found in this company")
    ),
    tag = "expenses",
    security(("bearer_auth" = []))
)]
pub async fn update_expense(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateExpenseRequest>,
) -> Result<ApiResponse<ExpenseResponse>, ApiError> {
    let related = payload.relation()?;
    let expense = ExpenseRepository::new((*state.db).clone())
        .update(
            tenant.id(),
            id,
            UpdateExpenseInput {
                operation_date: payload.operation_date,
                category_id: payload.category_id,
                amount: payload.amount,
                description: payload.description,
                related,
            },
        )
        .await?;
    Ok(ApiResponse::ok("Expense updated", expense.into()))
}

/// DELETE `/expense/{id}` - Delete an expense.
#[utoipa::path(
    delete,
    path = "/api/v1/expense/{id}",
    params(("id" = Uuid, Path, description = "Expense ID"), ("x-company-id" = Uuid, Header, description = "Company")),
    responses(
        (status = 200, description = "Expense deleted"),
        (status = 404, description = "Not found in this company")
    ),
    tag = "expenses",
    security(("bearer_auth" = []))
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    ExpenseRepository::new((*state.db).clone())
        .delete(tenant.id(), id)
        .await?;
    Ok(ApiResponse::ok("Expense deleted", ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(body: &str) -> UpdateExpenseRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_update_relation_pairs() {
        assert_eq!(patch("{}").relation(), Ok(None));
        assert_eq!(
            patch(r#"{"relatedId": null, "relatedModel": null}"#).relation(),
            Ok(Some(None))
        );

        let id = Uuid::new_v4();
        let body = format!(r#"{{"relatedId": "{id}", "relatedModel": "Employee"}}"#);
        assert_eq!(
            patch(&body).relation(),
            Ok(Some(Some(RelationRef {
                id,
                model: RelatedModel::Employee
            })))
        );
    }

    #[test]
    fn test_update_relation_rejects_half_pair() {
        let body = format!(r#"{{"relatedId": "{}"}}"#, Uuid::new_v4());
        assert_eq!(patch(&body).relation(), Err(RelationError::Incomplete));
        assert_eq!(
            patch(r#"{"relatedId": null}"#).relation(),
            Err(RelationError::Incomplete)
        );
    }
}
