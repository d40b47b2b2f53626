//! Worksheets for report exports.

use super::sheet::{CellValue, SheetReport};
use crate::reports::{CustomerReport, MonthlyReport};

/// Monthly profit and loss sheet with a yearly totals row.
#[must_use]
pub fn monthly_report_sheet(report: &MonthlyReport) -> SheetReport {
    let mut sheet = SheetReport::new(
        "Monthly Report",
        format!("Monthly Report {}", report.year),
    )
    .column("Month", 14.0)
    .column("Income", 16.0)
    .column("Expense", 16.0)
    .column("Fuel", 16.0)
    .column("Total Cost", 16.0)
    .column("Net Profit", 16.0)
    .column("Profit Margin", 14.0);

    for entry in &report.months {
        sheet.push_row(vec![
            CellValue::text(entry.month_name.as_str()),
            CellValue::Money(entry.income),
            CellValue::Money(entry.expense),
            CellValue::Money(entry.fuel),
            CellValue::Money(entry.total_cost),
            CellValue::Money(entry.net_profit),
            CellValue::Percent(entry.profit_margin),
        ]);
    }

    let totals = &report.totals;
    sheet.set_totals(vec![
        CellValue::text("Total"),
        CellValue::Money(totals.income),
        CellValue::Money(totals.expense),
        CellValue::Money(totals.fuel),
        CellValue::Money(totals.total_cost),
        CellValue::Money(totals.net_profit),
        CellValue::Percent(totals.profit_margin),
    ]);
    sheet
}

/// Customer receivables sheet; fully paid customers are highlighted.
#[must_use]
pub fn customer_report_sheet(report: &CustomerReport) -> SheetReport {
    let mut sheet = SheetReport::new(
        "Customer Report",
        format!(
            "Customer Report {} - {}",
            report.begin_date.format("%d.%m.%Y"),
            report.end_date.format("%d.%m.%Y")
        ),
    )
    .column("Customer", 28.0)
    .column("Invoices", 10.0)
    .column("Paid Invoices", 14.0)
    .column("Total Income", 16.0)
    .column("Paid Income", 16.0)
    .column("Payments", 16.0)
    .column("Receivable", 16.0)
    .column("Payment Rate", 14.0);

    for entry in &report.customers {
        sheet.push_row_highlighted(
            vec![
                CellValue::text(entry.customer_name.as_str()),
                CellValue::Number(entry.invoice_count.into()),
                CellValue::Number(entry.paid_invoice_count.into()),
                CellValue::Money(entry.total_income),
                CellValue::Money(entry.paid_income),
                CellValue::Money(entry.total_payments),
                CellValue::Money(entry.remaining_receivable),
                CellValue::Percent(entry.payment_rate),
            ],
            entry.is_fully_paid,
        );
    }

    let totals = &report.totals;
    sheet.set_totals(vec![
        CellValue::text("Total"),
        CellValue::Number(totals.invoice_count.into()),
        CellValue::Number(totals.paid_invoice_count.into()),
        CellValue::Money(totals.total_income),
        CellValue::Money(totals.paid_income),
        CellValue::Money(totals.total_payments),
        CellValue::Money(totals.remaining_receivable),
        CellValue::Percent(totals.payment_rate),
    ]);
    sheet
}
