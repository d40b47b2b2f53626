//! Spreadsheet exports of record lists.
//!
//! Sheets are built from repository rows with [`SheetReport`] and sent back
//! as an `.xlsx` attachment.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tally_core::export::{CellValue, SheetReport, XLSX_CONTENT_TYPE, export_filename};
use tally_core::listing::DateRange;
use tally_core::relation::RelatedEntity;
use tally_db::ExpenseWithRelated;
use tally_db::entities::{fuels, incomes, payments};
use uuid::Uuid;

use crate::error::ApiError;

/// Renders `sheet` and wraps it in an attachment response.
///
/// The file is named `<prefix>-<from>-<to>.xlsx`.
pub fn xlsx_attachment(
    sheet: &SheetReport,
    prefix: &str,
    range: &DateRange,
) -> Result<Response, ApiError> {
    let bytes = sheet.to_xlsx()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(prefix, range)
    );
    tracing::debug!(prefix, rows = sheet.row_count(), "rendered export");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn title(name: &str, range: &DateRange) -> String {
    format!(
        "{name} {} - {}",
        range.from.format("%d.%m.%Y"),
        range.to.format("%d.%m.%Y")
    )
}

fn name_of(names: &HashMap<Uuid, String>, id: Uuid) -> CellValue {
    CellValue::opt_text(names.get(&id).map(String::as_str))
}

/// Income sheet; paid rows are highlighted.
#[must_use]
pub fn income_sheet(
    rows: &[incomes::Model],
    customers: &HashMap<Uuid, String>,
    categories: &HashMap<Uuid, String>,
    range: &DateRange,
) -> SheetReport {
    let mut sheet = SheetReport::new("Incomes", title("Incomes", range))
        .column("Date", 12.0)
        .column("Customer", 24.0)
        .column("Category", 20.0)
        .column("Units", 10.0)
        .column("Unit Price", 14.0)
        .column("Total", 14.0)
        .column("Paid", 8.0)
        .column("Description", 32.0);

    let mut total = Decimal::ZERO;
    for income in rows {
        total += income.total_amount;
        sheet.push_row_highlighted(
            vec![
                CellValue::Date(income.operation_date),
                name_of(customers, income.customer_id),
                name_of(categories, income.category_id),
                CellValue::Number(income.unit_count),
                CellValue::Money(income.unit_price),
                CellValue::Money(income.total_amount),
                CellValue::Flag(income.is_paid),
                CellValue::opt_text(income.description.as_deref()),
            ],
            income.is_paid,
        );
    }
    sheet.set_totals(vec![
        CellValue::text("Total"),
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Money(total),
        CellValue::Empty,
        CellValue::Empty,
    ]);
    sheet
}

/// Expense sheet with the related vehicle or employee spelled out.
#[must_use]
pub fn expense_sheet(
    rows: &[ExpenseWithRelated],
    categories: &HashMap<Uuid, String>,
    range: &DateRange,
) -> SheetReport {
    let mut sheet = SheetReport::new("Expenses", title("Expenses", range))
        .column("Date", 12.0)
        .column("Category", 20.0)
        .column("Amount", 14.0)
        .column("Related", 24.0)
        .column("Description", 32.0);

    let mut total = Decimal::ZERO;
    for row in rows {
        let expense = &row.expense;
        total += expense.amount;
        let related = match &row.related {
            Some(RelatedEntity::Vehicle { plate_number }) => CellValue::text(plate_number.as_str()),
            Some(RelatedEntity::Employee { full_name }) => CellValue::text(full_name.as_str()),
            None => CellValue::Empty,
        };
        sheet.push_row(vec![
            CellValue::Date(expense.operation_date),
            name_of(categories, expense.category_id),
            CellValue::Money(expense.amount),
            related,
            CellValue::opt_text(expense.description.as_deref()),
        ]);
    }
    sheet.set_totals(vec![
        CellValue::text("Total"),
        CellValue::Empty,
        CellValue::Money(total),
        CellValue::Empty,
        CellValue::Empty,
    ]);
    sheet
}

/// Fuel sheet; rows pair each purchase with its vehicle plate.
#[must_use]
pub fn fuel_sheet(rows: &[(fuels::Model, Option<String>)], range: &DateRange) -> SheetReport {
    let mut sheet = SheetReport::new("Fuels", title("Fuel Purchases", range))
        .column("Date", 12.0)
        .column("Plate", 14.0)
        .column("Driver", 20.0)
        .column("Invoice", 16.0)
        .column("Total Price", 14.0)
        .column("Description", 32.0);

    let mut total = Decimal::ZERO;
    for (fuel, plate) in rows {
        total += fuel.total_price;
        sheet.push_row(vec![
            CellValue::Date(fuel.operation_date),
            CellValue::opt_text(plate.as_deref()),
            CellValue::opt_text(fuel.driver_name.as_deref()),
            CellValue::opt_text(fuel.invoice_number.as_deref()),
            CellValue::Money(fuel.total_price),
            CellValue::opt_text(fuel.description.as_deref()),
        ]);
    }
    sheet.set_totals(vec![
        CellValue::text("Total"),
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Money(total),
        CellValue::Empty,
    ]);
    sheet
}

/// Payment sheet; rows pair each payment with its customer name.
#[must_use]
pub fn payment_sheet(
    rows: &[(payments::Model, Option<String>)],
    range: &DateRange,
) -> SheetReport {
    let mut sheet = SheetReport::new("Payments", title("Payments", range))
        .column("Date", 12.0)
        .column("Customer", 24.0)
        .column("Amount", 14.0)
        .column("Description", 32.0);

    let mut total = Decimal::ZERO;
    for (payment, customer) in rows {
        total += payment.amount;
        sheet.push_row(vec![
            CellValue::Date(payment.operation_date),
            CellValue::opt_text(customer.as_deref()),
            CellValue::Money(payment.amount),
            CellValue::opt_text(payment.description.as_deref()),
        ]);
    }
    sheet.set_totals(vec![
        CellValue::text("Total"),
        CellValue::Empty,
        CellValue::Money(total),
        CellValue::Empty,
    ]);
    sheet
}
