//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain rules, aggregations and export layouts live here.
//!
//! # Modules
//!
//! - `auth` - Password hashing and user roles
//! - `listing` - Date ranges and search terms for list endpoints
//! - `records` - Write-time rules for bookkeeping records
//! - `relation` - Polymorphic expense relations
//! - `reports` - Monthly, customer, category and summary reports
//! - `export` - Excel workbook rendering

pub mod auth;
pub mod export;
pub mod listing;
pub mod records;
pub mod relation;
pub mod reports;
