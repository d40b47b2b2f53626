//! Expense repository, including polymorphic relation resolution.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{CategoryType, ensure_amount, normalize_optional};
use tally_core::relation::{RelatedEntity, RelationBatch, RelationLookup, RelationRef};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::category::CategoryRepository;
use super::employee::EmployeeRepository;
use super::error::RepositoryError;
use super::query::{apply_listing, paginate};
use super::vehicle::VehicleRepository;
use crate::entities::{employees, expenses, sea_orm_active_enums::RelatedModel, vehicles};

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Expense category.
    pub category_id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// Free text.
    pub description: Option<String>,
    /// Related vehicle or employee.
    pub related: Option<RelationRef>,
}

/// Input for updating an expense.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New relation; `Some(None)` detaches it.
    pub related: Option<Option<RelationRef>>,
}

/// Expense-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Only expenses of this category.
    pub category_id: Option<Uuid>,
    /// Only expenses related to this kind of record.
    pub related_model: Option<RelatedModel>,
}

/// An expense with its related record's projection.
///
/// `related` is `None` both for unrelated expenses and for dangling
/// references; `expense.related_id` tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseWithRelated {
    /// The stored row.
    pub expense: expenses::Model,
    /// Projection of the related record.
    pub related: Option<RelatedEntity>,
}

/// Expense repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    const SEARCH: [expenses::Column; 1] = [expenses::Column::Description];

    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the category or related record is missing
    /// from the tenant and `Validation` for an income category or a
    /// negative amount.
    pub async fn create(
        &self,
        input: CreateExpenseInput,
    ) -> Result<ExpenseWithRelated, RepositoryError> {
        ensure_amount("amount", input.amount)?;
        CategoryRepository::new(self.db.clone())
            .ensure_kind(input.company_id, input.category_id, CategoryType::Expense)
            .await?;
        if let Some(related) = &input.related {
            self.ensure_related(input.company_id, related).await?;
        }

        let now = chrono::Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            operation_date: Set(input.operation_date),
            category_id: Set(input.category_id),
            amount: Set(input.amount),
            description: Set(normalize_optional(input.description)),
            related_id: Set(input.related.map(|r| r.id)),
            related_model: Set(input.related.map(|r| r.model.into())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let expense = expense.insert(&self.db).await?;
        tracing::info!(
            company_id = %expense.company_id,
            expense_id = %expense.id,
            amount = %expense.amount,
            "expense recorded"
        );
        self.attach_one(expense).await
    }

    /// Lists a tenant's expenses, newest first, with related projections.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        expense_filter: &ExpenseFilter,
        page: &PageRequest,
    ) -> Result<PagedList<ExpenseWithRelated>, RepositoryError> {
        let select = Self::filtered(company_id, filter, expense_filter);
        let page = paginate(&self.db, select, page).await?;

        let lookup = self.lookup(company_id, &page.items).await?;
        Ok(page.map(|expense| Self::splice(&lookup, expense)))
    }

    /// All matching expenses without pagination, for spreadsheet export.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_all(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        expense_filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseWithRelated>, RepositoryError> {
        let rows = Self::filtered(company_id, filter, expense_filter)
            .all(&self.db)
            .await?;
        let lookup = self.lookup(company_id, &rows).await?;
        Ok(rows
            .into_iter()
            .map(|expense| Self::splice(&lookup, expense))
            .collect())
    }

    /// Finds a tenant's expense with its related projection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<ExpenseWithRelated, RepositoryError> {
        let expense = self.find_row(company_id, id).await?;
        self.attach_one(expense).await
    }

    /// Updates a tenant's expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateExpenseInput,
    ) -> Result<ExpenseWithRelated, RepositoryError> {
        let expense = self.find_row(company_id, id).await?;
        let mut active: expenses::ActiveModel = expense.into();

        if let Some(amount) = input.amount {
            ensure_amount("amount", amount)?;
            active.amount = Set(amount);
        }
        if let Some(category_id) = input.category_id {
            CategoryRepository::new(self.db.clone())
                .ensure_kind(company_id, category_id, CategoryType::Expense)
                .await?;
            active.category_id = Set(category_id);
        }
        if let Some(related) = input.related {
            if let Some(target) = &related {
                self.ensure_related(company_id, target).await?;
            }
            active.related_id = Set(related.map(|r| r.id));
            active.related_model = Set(related.map(|r| r.model.into()));
        }
        if let Some(operation_date) = input.operation_date {
            active.operation_date = Set(operation_date);
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, expense_id = %id, "expense updated");
        self.attach_one(updated).await
    }

    /// Deletes a tenant's expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Expense"));
        }
        tracing::info!(company_id = %company_id, expense_id = %id, "expense deleted");
        Ok(())
    }

    fn filtered(
        company_id: Uuid,
        filter: &ListFilter,
        expense_filter: &ExpenseFilter,
    ) -> Select<expenses::Entity> {
        let mut select =
            expenses::Entity::find().filter(expenses::Column::CompanyId.eq(company_id));
        if let Some(category_id) = expense_filter.category_id {
            select = select.filter(expenses::Column::CategoryId.eq(category_id));
        }
        if let Some(model) = expense_filter.related_model {
            select = select.filter(expenses::Column::RelatedModel.eq(model));
        }
        apply_listing(
            select,
            filter,
            &Self::SEARCH,
            Some(expenses::Column::OperationDate),
        )
        .order_by_desc(expenses::Column::OperationDate)
        .order_by_desc(expenses::Column::CreatedAt)
    }

    async fn find_row(&self, company_id: Uuid, id: Uuid) -> Result<expenses::Model, RepositoryError> {
        expenses::Entity::find_by_id(id)
            .filter(expenses::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Expense"))
    }

    async fn ensure_related(
        &self,
        company_id: Uuid,
        related: &RelationRef,
    ) -> Result<(), RepositoryError> {
        let (count, entity) = match RelatedModel::from(related.model) {
            RelatedModel::Vehicle => (
                vehicles::Entity::find_by_id(related.id)
                    .filter(vehicles::Column::CompanyId.eq(company_id))
                    .count(&self.db)
                    .await?,
                "Vehicle",
            ),
            RelatedModel::Employee => (
                employees::Entity::find_by_id(related.id)
                    .filter(employees::Column::CompanyId.eq(company_id))
                    .count(&self.db)
                    .await?,
                "Employee",
            ),
        };
        if count == 0 {
            return Err(RepositoryError::NotFound(entity));
        }
        Ok(())
    }

    async fn attach_one(
        &self,
        expense: expenses::Model,
    ) -> Result<ExpenseWithRelated, RepositoryError> {
        let lookup = self
            .lookup(expense.company_id, std::slice::from_ref(&expense))
            .await?;
        Ok(Self::splice(&lookup, expense))
    }

    /// One projection query per target table referenced by `rows`.
    async fn lookup(
        &self,
        company_id: Uuid,
        rows: &[expenses::Model],
    ) -> Result<RelationLookup, RepositoryError> {
        let refs: Vec<RelationRef> = rows.iter().filter_map(relation_of).collect();
        let batch = RelationBatch::collect(&refs);

        let vehicles = VehicleRepository::new(self.db.clone());
        let employees = EmployeeRepository::new(self.db.clone());
        let (plates, names) = tokio::try_join!(
            vehicles.plate_numbers(company_id, batch.vehicle_ids),
            employees.full_names(company_id, batch.employee_ids),
        )?;
        Ok(RelationLookup::new(plates, names))
    }

    fn splice(lookup: &RelationLookup, expense: expenses::Model) -> ExpenseWithRelated {
        let related = relation_of(&expense).and_then(|r| lookup.resolve(&r));
        ExpenseWithRelated { expense, related }
    }
}

fn relation_of(expense: &expenses::Model) -> Option<RelationRef> {
    match (expense.related_id, expense.related_model) {
        (Some(id), Some(model)) => Some(RelationRef {
            id,
            model: model.into(),
        }),
        _ => None,
    }
}
