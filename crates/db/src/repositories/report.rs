//! Report repository: sums tenant records with grouped queries and hands the
//! sums to the report service.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Select,
};
use tally_core::listing::DateRange;
use tally_core::records::CategoryType;
use tally_core::reports::{
    CategoryFact, CategoryReport, CustomerReport, DatedAmount, IncomeFact, MonthLocale,
    MonthlyReport, PaymentFact, ReportService, SummaryReport,
};
use uuid::Uuid;

use super::category::CategoryRepository;
use super::customer::CustomerRepository;
use super::error::RepositoryError;
use crate::entities::{expenses, fuels, incomes, payments};

/// Read-only repository behind the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Twelve-month profit and loss for `year`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an unsupported year or a database error.
    pub async fn monthly(
        &self,
        company_id: Uuid,
        year: i32,
        locale: MonthLocale,
    ) -> Result<MonthlyReport, RepositoryError> {
        let range = DateRange::year(year)?;
        let (incomes, expenses, fuels) = tokio::try_join!(
            self.daily_sums(
                incomes::Entity::find().filter(incomes::Column::CompanyId.eq(company_id)),
                incomes::Column::OperationDate,
                incomes::Column::TotalAmount,
                &range,
            ),
            self.daily_sums(
                expenses::Entity::find().filter(expenses::Column::CompanyId.eq(company_id)),
                expenses::Column::OperationDate,
                expenses::Column::Amount,
                &range,
            ),
            self.daily_sums(
                fuels::Entity::find().filter(fuels::Column::CompanyId.eq(company_id)),
                fuels::Column::OperationDate,
                fuels::Column::TotalPrice,
                &range,
            ),
        )?;

        tracing::debug!(
            company_id = %company_id,
            year,
            income_days = incomes.len(),
            expense_days = expenses.len(),
            fuel_days = fuels.len(),
            "monthly report sums fetched"
        );
        Ok(ReportService::monthly_report(
            year, locale, &incomes, &expenses, &fuels,
        ))
    }

    /// Per-customer receivables for the range.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn customers(
        &self,
        company_id: Uuid,
        range: DateRange,
    ) -> Result<CustomerReport, RepositoryError> {
        let (incomes, payments) = tokio::try_join!(
            self.income_by_customer(company_id, &range),
            self.payment_by_customer(company_id, &range),
        )?;

        let ids: BTreeSet<Uuid> = incomes
            .iter()
            .map(|f| f.customer_id)
            .chain(payments.iter().map(|f| f.customer_id))
            .collect();
        let names = CustomerRepository::new(self.db.clone())
            .names(company_id, ids.into_iter().collect())
            .await?;

        Ok(ReportService::customer_report(
            range, &incomes, &payments, &names,
        ))
    }

    /// Per-category totals of expenses (or incomes) for the range.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn categories(
        &self,
        company_id: Uuid,
        category_type: CategoryType,
        range: DateRange,
    ) -> Result<CategoryReport, RepositoryError> {
        let rows: Vec<(Uuid, Decimal, i64)> = match category_type {
            CategoryType::Expense => {
                expenses::Entity::find()
                    .select_only()
                    .column(expenses::Column::CategoryId)
                    .column_as(expenses::Column::Amount.sum(), "amount")
                    .column_as(expenses::Column::Id.count(), "records")
                    .filter(expenses::Column::CompanyId.eq(company_id))
                    .filter(expenses::Column::OperationDate.between(range.from, range.to))
                    .group_by(expenses::Column::CategoryId)
                    .into_tuple()
                    .all(&self.db)
                    .await?
            }
            CategoryType::Income => {
                incomes::Entity::find()
                    .select_only()
                    .column(incomes::Column::CategoryId)
                    .column_as(incomes::Column::TotalAmount.sum(), "amount")
                    .column_as(incomes::Column::Id.count(), "records")
                    .filter(incomes::Column::CompanyId.eq(company_id))
                    .filter(incomes::Column::OperationDate.between(range.from, range.to))
                    .group_by(incomes::Column::CategoryId)
                    .into_tuple()
                    .all(&self.db)
                    .await?
            }
        };
        let facts: Vec<CategoryFact> = rows
            .into_iter()
            .map(|(category_id, amount, records)| CategoryFact {
                category_id,
                amount: money(amount),
                count: records.unsigned_abs(),
            })
            .collect();

        let ids: BTreeSet<Uuid> = facts.iter().map(|f| f.category_id).collect();
        let names = CategoryRepository::new(self.db.clone())
            .names(company_id, ids.into_iter().collect())
            .await?;

        Ok(ReportService::category_breakdown(
            category_type,
            range,
            &facts,
            &names,
        ))
    }

    /// Headline totals for the range.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn summary(
        &self,
        company_id: Uuid,
        range: DateRange,
    ) -> Result<SummaryReport, RepositoryError> {
        let (incomes, expenses, fuels, payments) = tokio::try_join!(
            self.income_by_customer(company_id, &range),
            self.period_sum(
                expenses::Entity::find().filter(expenses::Column::CompanyId.eq(company_id)),
                expenses::Column::OperationDate,
                expenses::Column::Amount,
                &range,
            ),
            self.period_sum(
                fuels::Entity::find().filter(fuels::Column::CompanyId.eq(company_id)),
                fuels::Column::OperationDate,
                fuels::Column::TotalPrice,
                &range,
            ),
            self.payment_by_customer(company_id, &range),
        )?;
        Ok(ReportService::summary(
            range, &incomes, expenses, fuels, &payments,
        ))
    }

    /// Invoiced totals per customer and paid flag.
    async fn income_by_customer(
        &self,
        company_id: Uuid,
        range: &DateRange,
    ) -> Result<Vec<IncomeFact>, RepositoryError> {
        let rows: Vec<(Uuid, bool, Decimal, i64)> = incomes::Entity::find()
            .select_only()
            .column(incomes::Column::CustomerId)
            .column(incomes::Column::IsPaid)
            .column_as(incomes::Column::TotalAmount.sum(), "amount")
            .column_as(incomes::Column::Id.count(), "invoices")
            .filter(incomes::Column::CompanyId.eq(company_id))
            .filter(incomes::Column::OperationDate.between(range.from, range.to))
            .group_by(incomes::Column::CustomerId)
            .group_by(incomes::Column::IsPaid)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(customer_id, is_paid, amount, invoices)| IncomeFact {
                customer_id,
                is_paid,
                amount: money(amount),
                count: invoices.unsigned_abs(),
            })
            .collect())
    }

    async fn payment_by_customer(
        &self,
        company_id: Uuid,
        range: &DateRange,
    ) -> Result<Vec<PaymentFact>, RepositoryError> {
        let rows: Vec<(Uuid, Decimal)> = payments::Entity::find()
            .select_only()
            .column(payments::Column::CustomerId)
            .column_as(payments::Column::Amount.sum(), "amount")
            .filter(payments::Column::CompanyId.eq(company_id))
            .filter(payments::Column::OperationDate.between(range.from, range.to))
            .group_by(payments::Column::CustomerId)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(customer_id, amount)| PaymentFact {
                customer_id,
                amount: money(amount),
            })
            .collect())
    }

    /// Sums `amount` per `date` within the range.
    async fn daily_sums<E, C>(
        &self,
        select: Select<E>,
        date: C,
        amount: C,
        range: &DateRange,
    ) -> Result<Vec<DatedAmount>, RepositoryError>
    where
        E: EntityTrait,
        C: ColumnTrait,
    {
        let rows: Vec<(NaiveDate, Decimal)> = select
            .select_only()
            .column(date)
            .column_as(amount.sum(), "amount")
            .filter(date.between(range.from, range.to))
            .group_by(date)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(date, amount)| DatedAmount {
                date,
                amount: money(amount),
            })
            .collect())
    }

    /// Sums `amount` over the range; zero when nothing matches.
    async fn period_sum<E, C>(
        &self,
        select: Select<E>,
        date: C,
        amount: C,
        range: &DateRange,
    ) -> Result<Decimal, RepositoryError>
    where
        E: EntityTrait,
        C: ColumnTrait,
    {
        let total: Option<Option<Decimal>> = select
            .select_only()
            .column_as(amount.sum(), "amount")
            .filter(date.between(range.from, range.to))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten().map_or(Decimal::ZERO, money))
    }
}

/// Rounds a database sum to cents.
fn money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
