//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::records::CategoryType;

/// Money booked on one day, summed by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatedAmount {
    /// Operation date.
    pub date: NaiveDate,
    /// Sum of the day's amounts.
    pub amount: Decimal,
}

/// Invoiced income for one customer and paid flag within a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeFact {
    /// Billed customer.
    pub customer_id: Uuid,
    /// Whether these invoices have been paid.
    pub is_paid: bool,
    /// Sum of `totalAmount`.
    pub amount: Decimal,
    /// Number of invoices in the group.
    pub count: u64,
}

/// Payments received from one customer within a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentFact {
    /// Paying customer.
    pub customer_id: Uuid,
    /// Sum of payment amounts.
    pub amount: Decimal,
}

/// Amounts booked against one category within a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFact {
    /// Category.
    pub category_id: Uuid,
    /// Sum of amounts.
    pub amount: Decimal,
    /// Number of records in the group.
    pub count: u64,
}

/// Profit and loss figures for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    /// Month number (1-12).
    pub month: u32,
    /// Localized month name.
    pub month_name: String,
    /// Income total.
    pub income: Decimal,
    /// Expense total.
    pub expense: Decimal,
    /// Fuel total.
    pub fuel: Decimal,
    /// `expense + fuel`.
    pub total_cost: Decimal,
    /// `income - total_cost`.
    pub net_profit: Decimal,
    /// Net profit as a percentage of income.
    pub profit_margin: Decimal,
}

/// Yearly totals of a monthly report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    /// Income total.
    pub income: Decimal,
    /// Expense total.
    pub expense: Decimal,
    /// Fuel total.
    pub fuel: Decimal,
    /// `expense + fuel`.
    pub total_cost: Decimal,
    /// `income - total_cost`.
    pub net_profit: Decimal,
    /// Net profit as a percentage of income.
    pub profit_margin: Decimal,
}

/// Twelve-month profit and loss report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    /// Reported year.
    pub year: i32,
    /// January through December, always twelve entries.
    pub months: Vec<MonthlyEntry>,
    /// Yearly totals.
    pub totals: MonthlyTotals,
}

/// Receivables for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReportEntry {
    /// Customer id.
    pub customer_id: Uuid,
    /// Customer name.
    pub customer_name: String,
    /// Sum of income totals.
    pub total_income: Decimal,
    /// Sum of paid income totals.
    pub paid_income: Decimal,
    /// Number of income records.
    pub invoice_count: u64,
    /// Number of paid income records.
    pub paid_invoice_count: u64,
    /// Sum of payments received.
    pub total_payments: Decimal,
    /// `total_income - total_payments`.
    pub remaining_receivable: Decimal,
    /// Payments as a percentage of income.
    pub payment_rate: Decimal,
    /// True when income exists and payments cover it.
    pub is_fully_paid: bool,
}

/// Grand totals of a customer report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReportTotals {
    /// Sum of income totals.
    pub total_income: Decimal,
    /// Sum of paid income totals.
    pub paid_income: Decimal,
    /// Number of income records.
    pub invoice_count: u64,
    /// Number of paid income records.
    pub paid_invoice_count: u64,
    /// Sum of payments received.
    pub total_payments: Decimal,
    /// `total_income - total_payments`.
    pub remaining_receivable: Decimal,
    /// Payments as a percentage of income.
    pub payment_rate: Decimal,
}

/// Per-customer receivables for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    /// First day of the period.
    pub begin_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Customers with activity, highest income first.
    pub customers: Vec<CustomerReportEntry>,
    /// Grand totals.
    pub totals: CustomerReportTotals,
}

/// Total for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReportEntry {
    /// Category id.
    pub category_id: Uuid,
    /// Category name.
    pub category_name: String,
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of records.
    pub count: u64,
    /// Share of the grand total, in percent.
    pub share: Decimal,
}

/// Category breakdown for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    /// Whether income or expense categories are reported.
    pub category_type: CategoryType,
    /// First day of the period.
    pub begin_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Grand total.
    pub total: Decimal,
    /// Categories, largest first.
    pub categories: Vec<CategoryReportEntry>,
}

/// Headline figures for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// First day of the period.
    pub begin_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Income total.
    pub total_income: Decimal,
    /// Paid income total.
    pub paid_income: Decimal,
    /// Unpaid income total.
    pub unpaid_income: Decimal,
    /// Expense total.
    pub total_expense: Decimal,
    /// Fuel total.
    pub total_fuel: Decimal,
    /// Payments received.
    pub total_payments: Decimal,
    /// `income - (expense + fuel)`.
    pub net_profit: Decimal,
    /// Net profit as a percentage of income.
    pub profit_margin: Decimal,
}
