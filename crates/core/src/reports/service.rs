//! Report generation service.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::locale::MonthLocale;
use super::types::{
    CategoryFact, CategoryReport, CategoryReportEntry, CustomerReport, CustomerReportEntry,
    CustomerReportTotals, DatedAmount, IncomeFact, MonthlyEntry, MonthlyReport, MonthlyTotals,
    PaymentFact, SummaryReport,
};
use crate::listing::DateRange;
use crate::records::CategoryType;

/// Service for generating reports from fetched facts.
pub struct ReportService;

impl ReportService {
    /// `part / whole × 100` rounded to 2 decimals, or zero when `whole` is zero.
    #[must_use]
    pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
        if whole.is_zero() {
            return Decimal::ZERO;
        }
        (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Builds the twelve-month profit and loss report for `year` from daily sums.
    ///
    /// Days outside `year` are ignored.
    #[must_use]
    pub fn monthly_report(
        year: i32,
        locale: MonthLocale,
        incomes: &[DatedAmount],
        expenses: &[DatedAmount],
        fuels: &[DatedAmount],
    ) -> MonthlyReport {
        let income = Self::by_month(year, incomes);
        let expense = Self::by_month(year, expenses);
        let fuel = Self::by_month(year, fuels);

        let months: Vec<MonthlyEntry> = (1..=12u32)
            .zip(income.iter().zip(expense.iter().zip(fuel.iter())))
            .map(|(month, (&income, (&expense, &fuel)))| {
                let total_cost = expense + fuel;
                let net_profit = income - total_cost;
                MonthlyEntry {
                    month,
                    month_name: locale.month_name(month).to_string(),
                    income,
                    expense,
                    fuel,
                    total_cost,
                    net_profit,
                    profit_margin: Self::percentage(net_profit, income),
                }
            })
            .collect();

        let mut totals = MonthlyTotals::default();
        for entry in &months {
            totals.income += entry.income;
            totals.expense += entry.expense;
            totals.fuel += entry.fuel;
        }
        totals.total_cost = totals.expense + totals.fuel;
        totals.net_profit = totals.income - totals.total_cost;
        totals.profit_margin = Self::percentage(totals.net_profit, totals.income);

        MonthlyReport {
            year,
            months,
            totals,
        }
    }

    /// Builds per-customer receivables for a period.
    ///
    /// Facts are already limited to `range`. Customers without incomes or
    /// payments are omitted; those missing from `names` get an empty name.
    #[must_use]
    pub fn customer_report(
        range: DateRange,
        incomes: &[IncomeFact],
        payments: &[PaymentFact],
        names: &HashMap<Uuid, String>,
    ) -> CustomerReport {
        let mut rows: HashMap<Uuid, CustomerReportEntry> = HashMap::new();
        for fact in incomes {
            let entry = Self::customer_row(&mut rows, names, fact.customer_id);
            entry.total_income += fact.amount;
            entry.invoice_count += fact.count;
            if fact.is_paid {
                entry.paid_income += fact.amount;
                entry.paid_invoice_count += fact.count;
            }
        }
        for fact in payments {
            Self::customer_row(&mut rows, names, fact.customer_id).total_payments += fact.amount;
        }

        let mut customers: Vec<CustomerReportEntry> = rows
            .into_values()
            .map(|mut row| {
                row.remaining_receivable = row.total_income - row.total_payments;
                row.payment_rate = Self::percentage(row.total_payments, row.total_income);
                row.is_fully_paid =
                    row.total_income > Decimal::ZERO && row.remaining_receivable <= Decimal::ZERO;
                row
            })
            .collect();
        customers.sort_by(|a, b| {
            b.total_income
                .cmp(&a.total_income)
                .then_with(|| a.customer_name.cmp(&b.customer_name))
        });

        let mut totals = CustomerReportTotals::default();
        for row in &customers {
            totals.total_income += row.total_income;
            totals.paid_income += row.paid_income;
            totals.invoice_count += row.invoice_count;
            totals.paid_invoice_count += row.paid_invoice_count;
            totals.total_payments += row.total_payments;
        }
        totals.remaining_receivable = totals.total_income - totals.total_payments;
        totals.payment_rate = Self::percentage(totals.total_payments, totals.total_income);

        CustomerReport {
            begin_date: range.from,
            end_date: range.to,
            customers,
            totals,
        }
    }

    /// Groups amounts by category with each category's share of the total.
    ///
    /// `facts` are already limited to `range`; several facts for one category
    /// are merged.
    #[must_use]
    pub fn category_breakdown(
        category_type: CategoryType,
        range: DateRange,
        facts: &[CategoryFact],
        names: &HashMap<Uuid, String>,
    ) -> CategoryReport {
        let mut groups: HashMap<Uuid, (Decimal, u64)> = HashMap::new();
        for fact in facts {
            let group = groups.entry(fact.category_id).or_default();
            group.0 += fact.amount;
            group.1 += fact.count;
        }

        let total: Decimal = groups.values().map(|(sum, _)| *sum).sum();
        let mut categories: Vec<CategoryReportEntry> = groups
            .into_iter()
            .map(|(category_id, (sum, count))| CategoryReportEntry {
                category_id,
                category_name: names.get(&category_id).cloned().unwrap_or_default(),
                total: sum,
                count,
                share: Self::percentage(sum, total),
            })
            .collect();
        categories.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });

        CategoryReport {
            category_type,
            begin_date: range.from,
            end_date: range.to,
            total,
            categories,
        }
    }

    /// Headline figures for a period from its grouped totals.
    #[must_use]
    pub fn summary(
        range: DateRange,
        incomes: &[IncomeFact],
        total_expense: Decimal,
        total_fuel: Decimal,
        payments: &[PaymentFact],
    ) -> SummaryReport {
        let total_income: Decimal = incomes.iter().map(|f| f.amount).sum();
        let paid_income: Decimal = incomes
            .iter()
            .filter(|f| f.is_paid)
            .map(|f| f.amount)
            .sum();
        let total_payments: Decimal = payments.iter().map(|f| f.amount).sum();
        let net_profit = total_income - total_expense - total_fuel;

        SummaryReport {
            begin_date: range.from,
            end_date: range.to,
            total_income,
            paid_income,
            unpaid_income: total_income - paid_income,
            total_expense,
            total_fuel,
            total_payments,
            net_profit,
            profit_margin: Self::percentage(net_profit, total_income),
        }
    }

    fn customer_row<'a>(
        rows: &'a mut HashMap<Uuid, CustomerReportEntry>,
        names: &HashMap<Uuid, String>,
        id: Uuid,
    ) -> &'a mut CustomerReportEntry {
        rows.entry(id).or_insert_with(|| CustomerReportEntry {
            customer_id: id,
            customer_name: names.get(&id).cloned().unwrap_or_default(),
            total_income: Decimal::ZERO,
            paid_income: Decimal::ZERO,
            invoice_count: 0,
            paid_invoice_count: 0,
            total_payments: Decimal::ZERO,
            remaining_receivable: Decimal::ZERO,
            payment_rate: Decimal::ZERO,
            is_fully_paid: false,
        })
    }

    fn by_month(year: i32, days: &[DatedAmount]) -> [Decimal; 12] {
        let mut months = [Decimal::ZERO; 12];
        for day in days {
            if let Some(slot) = Self::month_slot(year, day.date) {
                months[slot] += day.amount;
            }
        }
        months
    }

    fn month_slot(year: i32, date: NaiveDate) -> Option<usize> {
        (date.year() == year).then(|| date.month0() as usize)
    }
}
