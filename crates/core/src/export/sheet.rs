//! Worksheet builder and xlsx rendering.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};
use tally_shared::AppError;
use thiserror::Error;

use crate::listing::DateRange;

/// MIME type of generated workbooks.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MONEY_FORMAT: &str = "#,##0.00";
const NUMBER_FORMAT: &str = "#,##0.##";
const PERCENT_FORMAT: &str = "0.00\"%\"";
const DATE_FORMAT: &str = "dd.mm.yyyy";

const HEADER_FILL: u32 = 0x00D9_E1F2;
const HIGHLIGHT_FILL: u32 = 0x00C6_EFCE;
const TOTALS_FILL: u32 = 0x00F2_F2F2;

/// Errors raised while rendering a workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The sheet has no columns.
    #[error("sheet '{0}' has no columns")]
    NoColumns(String),

    /// A row does not match the column count.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        /// Zero-based data row index.
        row: usize,
        /// Column count.
        expected: usize,
        /// Cells in the row.
        found: usize,
    },

    /// The sheet exceeds Excel's grid.
    #[error("sheet is too large to export")]
    TooLarge,

    /// The xlsx writer failed.
    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Plain text.
    Text(String),
    /// Money amount rendered with two decimals.
    Money(Decimal),
    /// Plain number.
    Number(Decimal),
    /// Value already expressed in percent (`12.5` renders as `12.50%`).
    Percent(Decimal),
    /// Calendar date.
    Date(NaiveDate),
    /// Yes/No flag.
    Flag(bool),
    /// Empty cell.
    Empty,
}

impl CellValue {
    /// Text cell from anything string-like.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text cell from an optional string, empty when absent.
    #[must_use]
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Empty, |v| Self::Text(v.to_string()))
    }
}

/// A column header and its width in characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header text.
    pub header: String,
    /// Column width.
    pub width: f64,
}

#[derive(Debug, Clone)]
struct SheetRow {
    cells: Vec<CellValue>,
    highlighted: bool,
}

/// A single titled worksheet.
///
/// Layout: row 0 holds the title merged across every column, row 1 the
/// header, then the data rows and an optional totals row.
#[derive(Debug, Clone)]
pub struct SheetReport {
    sheet_name: String,
    title: String,
    columns: Vec<Column>,
    rows: Vec<SheetRow>,
    totals: Option<Vec<CellValue>>,
}

impl SheetReport {
    /// Starts a sheet with a tab name and a title line.
    pub fn new(sheet_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            title: title.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            totals: None,
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, header: impl Into<String>, width: f64) -> Self {
        self.columns.push(Column {
            header: header.into(),
            width,
        });
        self
    }

    /// Appends a data row.
    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        self.rows.push(SheetRow {
            cells,
            highlighted: false,
        });
    }

    /// Appends a data row, filled green when `highlighted`.
    pub fn push_row_highlighted(&mut self, cells: Vec<CellValue>, highlighted: bool) {
        self.rows.push(SheetRow { cells, highlighted });
    }

    /// Sets the bold totals row.
    pub fn set_totals(&mut self, cells: Vec<CellValue>) {
        self.totals = Some(cells);
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the sheet into xlsx bytes.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        if self.columns.is_empty() {
            return Err(ExportError::NoColumns(self.sheet_name.clone()));
        }
        let width = self.columns.len();
        for (row, cells) in self
            .rows
            .iter()
            .map(|r| &r.cells)
            .chain(self.totals.iter())
            .enumerate()
        {
            if cells.len() != width {
                return Err(ExportError::RowWidth {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }

        let last_col = u16::try_from(width - 1).map_err(|_| ExportError::TooLarge)?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;

        let title_format = Format::new()
            .set_bold()
            .set_font_size(14)
            .set_align(FormatAlign::Center);
        sheet.merge_range(0, 0, 0, last_col, &self.title, &title_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);
        for (col, column) in self.columns.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| ExportError::TooLarge)?;
            sheet.write_string_with_format(1, col, &column.header, &header_format)?;
            sheet.set_column_width(col, column.width)?;
        }

        let mut row_index: u32 = 2;
        for row in &self.rows {
            let fill = row.highlighted.then_some(HIGHLIGHT_FILL);
            write_cells(sheet, row_index, &row.cells, fill, false)?;
            row_index = row_index.checked_add(1).ok_or(ExportError::TooLarge)?;
        }
        if let Some(totals) = &self.totals {
            write_cells(sheet, row_index, totals, Some(TOTALS_FILL), true)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn cell_format(value: &CellValue, fill: Option<u32>, bold: bool) -> Format {
    let mut format = Format::new().set_border(FormatBorder::Thin);
    format = match value {
        CellValue::Money(_) => format.set_num_format(MONEY_FORMAT),
        CellValue::Number(_) => format.set_num_format(NUMBER_FORMAT),
        CellValue::Percent(_) => format.set_num_format(PERCENT_FORMAT),
        CellValue::Date(_) => format
            .set_num_format(DATE_FORMAT)
            .set_align(FormatAlign::Center),
        CellValue::Flag(_) => format.set_align(FormatAlign::Center),
        CellValue::Text(_) | CellValue::Empty => format,
    };
    if let Some(color) = fill {
        format = format.set_background_color(Color::RGB(color));
    }
    if bold {
        format = format.set_bold();
    }
    format
}

fn write_cells(
    sheet: &mut Worksheet,
    row: u32,
    cells: &[CellValue],
    fill: Option<u32>,
    bold: bool,
) -> Result<(), ExportError> {
    for (col, value) in cells.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| ExportError::TooLarge)?;
        let format = cell_format(value, fill, bold);
        match value {
            CellValue::Text(text) => {
                sheet.write_string_with_format(row, col, text, &format)?;
            }
            CellValue::Money(amount) | CellValue::Number(amount) | CellValue::Percent(amount) => {
                sheet.write_number_with_format(row, col, to_number(*amount), &format)?;
            }
            CellValue::Date(date) => match excel_date(*date) {
                Some(datetime) => {
                    sheet.write_datetime_with_format(row, col, &datetime, &format)?;
                }
                // Excel serial dates start in 1900
                None => {
                    let text = date.format("%d.%m.%Y").to_string();
                    sheet.write_string_with_format(row, col, &text, &format)?;
                }
            },
            CellValue::Flag(flag) => {
                let text = if *flag { "Yes" } else { "No" };
                sheet.write_string_with_format(row, col, text, &format)?;
            }
            CellValue::Empty => {
                sheet.write_blank(row, col, &format)?;
            }
        }
    }
    Ok(())
}

// Spreadsheet cells are IEEE doubles; the conversion is display-only.
fn to_number(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

fn excel_date(date: NaiveDate) -> Option<ExcelDateTime> {
    let year = u16::try_from(date.year()).ok()?;
    let month = u8::try_from(date.month()).ok()?;
    let day = u8::try_from(date.day()).ok()?;
    ExcelDateTime::from_ymd(year, month, day).ok()
}

/// Attachment file name: `<prefix>-<from>-<to>.xlsx`.
#[must_use]
pub fn export_filename(prefix: &str, range: &DateRange) -> String {
    format!("{prefix}-{}-{}.xlsx", range.from, range.to)
}
