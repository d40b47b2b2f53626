//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod categories;
pub mod companies;
pub mod customers;
pub mod employees;
pub mod error_logs;
pub mod expenses;
pub mod fuels;
pub mod incomes;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod users;
pub mod vehicles;
