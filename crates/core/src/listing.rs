//! Date range and search rules shared by every list endpoint.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tally_shared::AppError;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors raised while building list filters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The begin date lies after the end date.
    #[error("beginDate {from} must not be after endDate {to}")]
    InvalidDateRange {
        /// Requested begin date.
        from: NaiveDate,
        /// Requested end date.
        to: NaiveDate,
    },

    /// The year cannot be represented as a calendar range.
    #[error("Invalid year: {0}")]
    InvalidYear(i32),
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// An inclusive range of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range (inclusive).
    pub to: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting reversed bounds.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ListingError> {
        if from > to {
            return Err(ListingError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Resolves optional client bounds.
    ///
    /// A missing begin defaults to the first day of `today`'s month and a
    /// missing end to the last day of that month.
    pub fn resolve(
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ListingError> {
        let month = Self::month_of(today);
        Self::new(begin.unwrap_or(month.from), end.unwrap_or(month.to))
    }

    /// The calendar month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        let from = date.with_day(1).unwrap_or(date);
        let to = from
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { from, to }
    }

    /// January 1st through December 31st of `year`.
    pub fn year(year: i32) -> Result<Self, ListingError> {
        let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(ListingError::InvalidYear(year))?;
        let to = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(ListingError::InvalidYear(year))?;
        Ok(Self { from, to })
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// A trimmed, non-empty free-text search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Parses a raw query value; blank input means no search.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// The term as the client sent it, trimmed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased `LIKE` pattern matching the term anywhere.
    ///
    /// `%`, `_` and `\` inside the term are escaped with `\`.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for ch in self.0.to_lowercase().chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}

/// Filters common to every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Optional free-text search.
    pub search: Option<SearchTerm>,
    /// Optional date range, only used by dated records.
    pub range: Option<DateRange>,
}

impl ListFilter {
    /// Filter with only a search term.
    #[must_use]
    pub fn search(raw: Option<&str>) -> Self {
        Self {
            search: SearchTerm::parse(raw),
            range: None,
        }
    }

    /// Filter with a search term and a date range.
    #[must_use]
    pub fn dated(raw: Option<&str>, range: DateRange) -> Self {
        Self {
            search: SearchTerm::parse(raw),
            range: Some(range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(d(2024, 2, 14), d(2024, 2, 1), d(2024, 2, 29))]
    #[case(d(2023, 2, 1), d(2023, 2, 1), d(2023, 2, 28))]
    #[case(d(2024, 12, 31), d(2024, 12, 1), d(2024, 12, 31))]
    #[case(d(2024, 4, 30), d(2024, 4, 1), d(2024, 4, 30))]
    fn test_month_of(#[case] date: NaiveDate, #[case] from: NaiveDate, #[case] to: NaiveDate) {
        assert_eq!(DateRange::month_of(date), DateRange { from, to });
    }

    #[test]
    fn test_resolve_defaults_to_current_month() {
        let range = DateRange::resolve(None, None, d(2024, 6, 15)).unwrap();
        assert_eq!(range.from, d(2024, 6, 1));
        assert_eq!(range.to, d(2024, 6, 30));
    }

    #[test]
    fn test_resolve_fills_only_missing_bound() {
        let range = DateRange::resolve(Some(d(2024, 1, 10)), None, d(2024, 6, 15)).unwrap();
        assert_eq!(range.from, d(2024, 1, 10));
        assert_eq!(range.to, d(2024, 6, 30));

        let range = DateRange::resolve(None, Some(d(2024, 6, 20)), d(2024, 6, 15)).unwrap();
        assert_eq!(range.from, d(2024, 6, 1));
        assert_eq!(range.to, d(2024, 6, 20));
    }

    #[test]
    fn test_resolve_rejects_reversed_bounds() {
        let err = DateRange::resolve(Some(d(2024, 7, 1)), Some(d(2024, 6, 1)), d(2024, 6, 15))
            .unwrap_err();
        assert!(matches!(err, ListingError::InvalidDateRange { .. }));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
        assert!(range.contains(d(2024, 3, 1)));
        assert!(range.contains(d(2024, 3, 31)));
        assert!(!range.contains(d(2024, 4, 1)));
        assert!(!range.contains(d(2024, 2, 29)));
    }

    #[test]
    fn test_year_range() {
        let range = DateRange::year(2025).unwrap();
        assert_eq!(range.from, d(2025, 1, 1));
        assert_eq!(range.to, d(2025, 12, 31));
        assert!(DateRange::year(i32::MAX).is_err());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    #[case(Some(" Acme "), Some("Acme"))]
    fn test_search_term_parse(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(
            SearchTerm::parse(raw).as_ref().map(SearchTerm::as_str),
            expected
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let term = SearchTerm::parse(Some("50%_Off\\")).unwrap();
        assert_eq!(term.like_pattern(), "%50\\%\\_off\\\\%");
    }
}
