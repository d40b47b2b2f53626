//! Localized month names.

use serde::Deserialize;

const EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const TR: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// Language used for month names in reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthLocale {
    /// English.
    #[default]
    En,
    /// Turkish.
    Tr,
}

impl MonthLocale {
    /// Parses a configured locale code, falling back to English.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "tr" | "tr-tr" => Self::Tr,
            _ => Self::En,
        }
    }

    /// Name of `month` (1-12); out-of-range values yield an empty string.
    #[must_use]
    pub fn month_name(self, month: u32) -> &'static str {
        let names = match self {
            Self::En => &EN,
            Self::Tr => &TR,
        };
        month
            .checked_sub(1)
            .and_then(|i| names.get(i as usize))
            .copied()
            .unwrap_or("")
    }
}
