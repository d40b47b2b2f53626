//! Excel export.
//!
//! [`SheetReport`] describes one titled worksheet; [`SheetReport::to_xlsx`]
//! renders it into an in-memory `.xlsx` file.

mod reports;
mod sheet;


pub use reports::{customer_report_sheet, monthly_report_sheet};
pub use sheet::{CellValue, Column, ExportError, SheetReport, XLSX_CONTENT_TYPE, export_filename};
