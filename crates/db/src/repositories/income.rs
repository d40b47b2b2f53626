//! Income repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{CategoryType, income_total, normalize_optional};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::category::CategoryRepository;
use super::customer::CustomerRepository;
use super::error::RepositoryError;
use super::query::{apply_listing, paginate};
use crate::entities::incomes;

/// Input for creating an income.
#[derive(Debug, Clone)]
pub struct CreateIncomeInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Billed customer.
    pub customer_id: Uuid,
    /// Income category.
    pub category_id: Uuid,
    /// Quantity.
    pub unit_count: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Whether the invoice has been paid.
    pub is_paid: bool,
    /// Free text.
    pub description: Option<String>,
}

/// Input for updating an income.
#[derive(Debug, Clone, Default)]
pub struct UpdateIncomeInput {
    /// New customer.
    pub customer_id: Option<Uuid>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New quantity.
    pub unit_count: Option<Decimal>,
    /// New unit price.
    pub unit_price: Option<Decimal>,
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New paid flag.
    pub is_paid: Option<bool>,
    /// New description.
    pub description: Option<Option<String>>,
}

/// Income-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct IncomeFilter {
    /// Only this customer's incomes.
    pub customer_id: Option<Uuid>,
    /// Only incomes of this category.
    pub category_id: Option<Uuid>,
    /// Only paid (or unpaid) incomes.
    pub is_paid: Option<bool>,
}

/// Income repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct IncomeRepository {
    db: DatabaseConnection,
}

impl IncomeRepository {
    const SEARCH: [incomes::Column; 1] = [incomes::Column::Description];

    /// Creates a new income repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an income; the total is `unit_count × unit_price`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the customer or category is missing from the
    /// tenant and `Validation` for an expense category or negative factors.
    pub async fn create(&self, input: CreateIncomeInput) -> Result<incomes::Model, RepositoryError> {
        let total_amount = income_total(input.unit_count, input.unit_price)?;
        CustomerRepository::new(self.db.clone())
            .find(input.company_id, input.customer_id)
            .await?;
        CategoryRepository::new(self.db.clone())
            .ensure_kind(input.company_id, input.category_id, CategoryType::Income)
            .await?;

        let now = chrono::Utc::now().into();
        let income = incomes::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            customer_id: Set(input.customer_id),
            category_id: Set(input.category_id),
            unit_count: Set(input.unit_count),
            unit_price: Set(input.unit_price),
            total_amount: Set(total_amount),
            operation_date: Set(input.operation_date),
            is_paid: Set(input.is_paid),
            description: Set(normalize_optional(input.description)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let income = income.insert(&self.db).await?;
        tracing::info!(
            company_id = %income.company_id,
            income_id = %income.id,
            customer_id = %income.customer_id,
            total_amount = %income.total_amount,
            "income recorded"
        );
        Ok(income)
    }

    /// Lists a tenant's incomes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        income_filter: &IncomeFilter,
        page: &PageRequest,
    ) -> Result<PagedList<incomes::Model>, RepositoryError> {
        let select = Self::filtered(company_id, filter, income_filter);
        Ok(paginate(&self.db, select, page).await?)
    }

    /// All matching incomes without pagination, for spreadsheet export.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        income_filter: &IncomeFilter,
    ) -> Result<Vec<incomes::Model>, RepositoryError> {
        Ok(Self::filtered(company_id, filter, income_filter)
            .all(&self.db)
            .await?)
    }

    /// Finds a tenant's income.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(&self, company_id: Uuid, id: Uuid) -> Result<incomes::Model, RepositoryError> {
        incomes::Entity::find_by_id(id)
            .filter(incomes::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Income"))
    }

    /// Updates a tenant's income, recomputing the total when a factor changes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateIncomeInput,
    ) -> Result<incomes::Model, RepositoryError> {
        let income = self.find(company_id, id).await?;

        let recompute = input.unit_count.is_some() || input.unit_price.is_some();
        let unit_count = input.unit_count.unwrap_or(income.unit_count);
        let unit_price = input.unit_price.unwrap_or(income.unit_price);

        let mut active: incomes::ActiveModel = income.into();
        if recompute {
            active.total_amount = Set(income_total(unit_count, unit_price)?);
            active.unit_count = Set(unit_count);
            active.unit_price = Set(unit_price);
        }
        if let Some(customer_id) = input.customer_id {
            CustomerRepository::new(self.db.clone())
                .find(company_id, customer_id)
                .await?;
            active.customer_id = Set(customer_id);
        }
        if let Some(category_id) = input.category_id {
            CategoryRepository::new(self.db.clone())
                .ensure_kind(company_id, category_id, CategoryType::Income)
                .await?;
            active.category_id = Set(category_id);
        }
        if let Some(operation_date) = input.operation_date {
            active.operation_date = Set(operation_date);
        }
        if let Some(is_paid) = input.is_paid {
            active.is_paid = Set(is_paid);
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, income_id = %id, "income updated");
        Ok(updated)
    }

    /// Deletes a tenant's income.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = incomes::Entity::delete_many()
            .filter(incomes::Column::Id.eq(id))
            .filter(incomes::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Income"));
        }
        tracing::info!(company_id = %company_id, income_id = %id, "income deleted");
        Ok(())
    }

    fn filtered(
        company_id: Uuid,
        filter: &ListFilter,
        income_filter: &IncomeFilter,
    ) -> Select<incomes::Entity> {
        let mut select = incomes::Entity::find().filter(incomes::Column::CompanyId.eq(company_id));
        if let Some(customer_id) = income_filter.customer_id {
            select = select.filter(incomes::Column::CustomerId.eq(customer_id));
        }
        if let Some(category_id) = income_filter.category_id {
            select = select.filter(incomes::Column::CategoryId.eq(category_id));
        }
        if let Some(is_paid) = income_filter.is_paid {
            select = select.filter(incomes::Column::IsPaid.eq(is_paid));
        }
        apply_listing(
            select,
            filter,
            &Self::SEARCH,
            Some(incomes::Column::OperationDate),
        )
        .order_by_desc(incomes::Column::OperationDate)
        .order_by_desc(incomes::Column::CreatedAt)
    }
}
