//! Query parameters shared by list, export and report endpoints.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tally_core::listing::{DateRange, ListFilter, ListingError};
use tally_shared::PageRequest;
use utoipa::IntoParams;

/// Paging and search parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1); smaller values are raised to 1.
    pub page_number: Option<i64>,
    /// Items per page, clamped to 1..=100 (default 10).
    pub page_size: Option<i64>,
    /// Case-insensitive substring search.
    pub search: Option<String>,
}

impl ListQuery {
    /// Clamped page request.
    #[must_use]
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page_number, self.page_size)
    }

    /// Search-only filter for undated records.
    #[must_use]
    pub fn filter(&self) -> ListFilter {
        ListFilter::search(self.search.as_deref())
    }

    /// Search plus date range for dated records.
    pub fn dated(&self, range: &RangeQuery) -> Result<ListFilter, ListingError> {
        Ok(ListFilter::dated(self.search.as_deref(), range.resolve()?))
    }
}

/// Inclusive `beginDate`/`endDate` bounds, defaulting to the current month.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// First day (inclusive), `YYYY-MM-DD`.
    pub begin_date: Option<NaiveDate>,
    /// Last day (inclusive), `YYYY-MM-DD`.
    pub end_date: Option<NaiveDate>,
}

impl RangeQuery {
    /// Resolves the bounds against today's date.
    pub fn resolve(&self) -> Result<DateRange, ListingError> {
        DateRange::resolve(self.begin_date, self.end_date, Utc::now().date_naive())
    }
}

/// Distinguishes an absent field from an explicit `null` in update bodies.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.phone, None);

        let cleared: Patch = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(cleared.phone, Some(None));

        let set: Patch = serde_json::from_str(r#"{"phone": "555"}"#).unwrap();
        assert_eq!(set.phone, Some(Some("555".into())));
    }

    #[test]
    fn test_range_rejects_reversed_bounds() {
        let query = RangeQuery {
            begin_date: NaiveDate::from_ymd_opt(2025, 3, 31),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        assert!(query.resolve().is_err());
    }

    #[test]
    fn test_list_query_clamps_page() {
        let query = ListQuery {
            page_number: Some(0),
            page_size: Some(1000),
            search: Some("  ".into()),
        };
        let page = query.page();
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, 100);
        assert!(query.filter().search.is_none());
    }
}
