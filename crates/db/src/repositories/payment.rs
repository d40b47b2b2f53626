//! Customer payment repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{ensure_amount, normalize_optional};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::customer::CustomerRepository;
use super::error::RepositoryError;
use super::query::{apply_listing, paginate};
use crate::entities::{customers, payments};

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Paying customer.
    pub customer_id: Uuid,
    /// Amount received.
    pub amount: Decimal,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
}

/// Input for updating a payment.
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentInput {
    /// New customer.
    pub customer_id: Option<Uuid>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<Option<String>>,
}

/// Payment-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Only this customer's payments.
    pub customer_id: Option<Uuid>,
}

/// Payment repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    const SEARCH: [payments::Column; 1] = [payments::Column::Description];

    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the customer is missing from the tenant.
    pub async fn create(
        &self,
        input: CreatePaymentInput,
    ) -> Result<payments::Model, RepositoryError> {
        ensure_amount("amount", input.amount)?;
        CustomerRepository::new(self.db.clone())
            .find(input.company_id, input.customer_id)
            .await?;

        let now = chrono::Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            customer_id: Set(input.customer_id),
            amount: Set(input.amount),
            operation_date: Set(input.operation_date),
            description: Set(normalize_optional(input.description)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let payment = payment.insert(&self.db).await?;
        tracing::info!(
            company_id = %payment.company_id,
            payment_id = %payment.id,
            customer_id = %payment.customer_id,
            amount = %payment.amount,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Lists a tenant's payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        payment_filter: &PaymentFilter,
        page: &PageRequest,
    ) -> Result<PagedList<payments::Model>, RepositoryError> {
        let select = Self::filtered(company_id, filter, payment_filter);
        Ok(paginate(&self.db, select, page).await?)
    }

    /// All matching payments with the customer's name, for spreadsheet export.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        payment_filter: &PaymentFilter,
    ) -> Result<Vec<(payments::Model, Option<String>)>, RepositoryError> {
        let rows = Self::filtered(company_id, filter, payment_filter)
            .find_also_related(customers::Entity)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(payment, customer)| (payment, customer.map(|c| c.name)))
            .collect())
    }

    /// Finds a tenant's payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<payments::Model, RepositoryError> {
        payments::Entity::find_by_id(id)
            .filter(payments::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Payment"))
    }

    /// Updates a tenant's payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdatePaymentInput,
    ) -> Result<payments::Model, RepositoryError> {
        let payment = self.find(company_id, id).await?;
        let mut active: payments::ActiveModel = payment.into();

        if let Some(amount) = input.amount {
            ensure_amount("amount", amount)?;
            active.amount = Set(amount);
        }
        if let Some(customer_id) = input.customer_id {
            CustomerRepository::new(self.db.clone())
                .find(company_id, customer_id)
                .await?;
            active.customer_id = Set(customer_id);
        }
        if let Some(operation_date) = input.operation_date {
            active.operation_date = Set(operation_date);
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, payment_id = %id, "payment updated");
        Ok(updated)
    }

    /// Deletes a tenant's payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = payments::Entity::delete_many()
            .filter(payments::Column::Id.eq(id))
            .filter(payments::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Payment"));
        }
        tracing::info!(company_id = %company_id, payment_id = %id, "payment deleted");
        Ok(())
    }

    fn filtered(
        company_id: Uuid,
        filter: &ListFilter,
        payment_filter: &PaymentFilter,
    ) -> Select<payments::Entity> {
        let mut select =
            payments::Entity::find().filter(payments::Column::CompanyId.eq(company_id));
        if let Some(customer_id) = payment_filter.customer_id {
            select = select.filter(payments::Column::CustomerId.eq(customer_id));
        }
        apply_listing(
            select,
            filter,
            &Self::SEARCH,
            Some(payments::Column::OperationDate),
        )
        .order_by_desc(payments::Column::OperationDate)
        .order_by_desc(payments::Column::CreatedAt)
    }
}
