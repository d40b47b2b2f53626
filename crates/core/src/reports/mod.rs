//! Report aggregation.
//!
//! The database layer sums a tenant's records per day, customer or category
//! with grouped queries; this module rolls those sums up:
//! - Monthly profit and loss for a year
//! - Per-customer receivables
//! - Income and expense breakdown by category
//! - Period summary

pub mod locale;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use locale::MonthLocale;
pub use service::ReportService;
pub use types::*;
