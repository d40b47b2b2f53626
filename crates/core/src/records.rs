//! Write-time rules for bookkeeping records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::AppError;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors raised by record rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The referenced category is of the wrong kind.
    #[error("Category must be of type '{expected}'")]
    CategoryKindMismatch {
        /// Kind the record requires.
        expected: CategoryType,
    },

    /// An employee cannot leave before being hired.
    #[error("terminationDate must not be before hireDate")]
    TerminationBeforeHire,

    /// A money or quantity field is negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),

    /// A money or quantity field does not fit `NUMERIC(14,2)`.
    #[error("{0} must not exceed 999999999999.99")]
    TooLarge(&'static str),
}

/// Largest value a money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Whether a category classifies income or expense records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Used by incomes.
    Income,
    /// Used by expenses.
    Expense,
}

impl CategoryType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Fails unless `self` is the kind a record requires.
    pub fn ensure(self, expected: Self) -> Result<(), RecordError> {
        if self == expected {
            Ok(())
        } else {
            Err(RecordError::CategoryKindMismatch { expected })
        }
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income total: `unit_count × unit_price`, rounded to cents.
pub fn income_total(unit_count: Decimal, unit_price: Decimal) -> Result<Decimal, RecordError> {
    ensure_amount("unitCount", unit_count)?;
    ensure_amount("unitPrice", unit_price)?;
    let total = unit_count
        .checked_mul(unit_price)
        .ok_or(RecordError::TooLarge("totalAmount"))?
        .round_dp(2);
    ensure_amount("totalAmount", total)?;
    Ok(total)
}

/// Accepts amounts in `0..=MAX_AMOUNT`.
pub fn ensure_amount(field: &'static str, amount: Decimal) -> Result<(), RecordError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(RecordError::Negative(field));
    }
    if amount > MAX_AMOUNT {
        return Err(RecordError::TooLarge(field));
    }
    Ok(())
}

/// Checks that a termination date, when set, does not precede the hire date.
pub fn check_employment_dates(
    hire_date: Option<NaiveDate>,
    termination_date: Option<NaiveDate>,
) -> Result<(), RecordError> {
    match (hire_date, termination_date) {
        (Some(hired), Some(left)) if left < hired => Err(RecordError::TerminationBeforeHire),
        _ => Ok(()),
    }
}

/// Trims a display name.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

/// Trims and upper-cases a licence plate.
#[must_use]
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

/// Trims optional free text, mapping blank values to `None`.
#[must_use]
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_income_total() {
        assert_eq!(income_total(dec!(3), dec!(12.50)).unwrap(), dec!(37.50));
        assert_eq!(income_total(dec!(1.5), dec!(0.333)).unwrap(), dec!(0.50));
        assert_eq!(income_total(dec!(0), dec!(99)).unwrap(), dec!(0));
    }

    #[test]
    fn test_income_total_rejects_negative_factors() {
        assert_eq!(
            income_total(dec!(-1), dec!(10)),
            Err(RecordError::Negative("unitCount"))
        );
        assert_eq!(
            income_total(dec!(1), dec!(-10)),
            Err(RecordError::Negative("unitPrice"))
        );
    }

    #[test]
    fn test_income_total_out_of_range() {
        let huge = Decimal::from(10_000_000_000_000_000_i64);
        assert_eq!(
            income_total(huge, dec!(1)),
            Err(RecordError::TooLarge("unitCount"))
        );
        assert_eq!(
            income_total(Decimal::MAX, Decimal::MAX),
            Err(RecordError::TooLarge("unitCount"))
        );
        assert_eq!(
            income_total(dec!(999999999999.99), dec!(999999999999.99)),
            Err(RecordError::TooLarge("totalAmount"))
        );
        assert_eq!(
            income_total(dec!(1), MAX_AMOUNT),
            Ok(dec!(999999999999.99))
        );
    }

    #[test]
    fn test_category_kind() {
        assert!(CategoryType::Income.ensure(CategoryType::Income).is_ok());
        let err = CategoryType::Expense
            .ensure(CategoryType::Income)
            .unwrap_err();
        assert_eq!(err.to_string(), "Category must be of type 'income'");
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[test]
    fn test_employment_dates() {
        let hired = NaiveDate::from_ymd_opt(2024, 3, 1);
        let before = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(check_employment_dates(hired, hired).is_ok());
        assert!(check_employment_dates(None, before).is_ok());
        assert_eq!(
            check_employment_dates(hired, before),
            Err(RecordError::TerminationBeforeHire)
        );
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_name("  Acme Ltd "), "Acme Ltd");
        assert_eq!(normalize_plate(" 34 abc 123 "), "34 ABC 123");
        assert_eq!(normalize_optional(Some("  ".into())), None);
        assert_eq!(normalize_optional(Some(" x ".into())), Some("x".into()));
    }

    #[test]
    fn test_amount_bounds() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert!(ensure_amount("amount", dec!(0)).is_ok());
        assert!(ensure_amount("amount", dec!(10.25)).is_ok());
        assert!(ensure_amount("amount", MAX_AMOUNT).is_ok());
        assert_eq!(
            ensure_amount("amount", dec!(-0.01)),
            Err(RecordError::Negative("amount"))
        );
        assert_eq!(
            ensure_amount("salary", dec!(1000000000000)),
            Err(RecordError::TooLarge("salary"))
        );
    }
}
