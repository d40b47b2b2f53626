//! Enums stored as short strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::{auth, records, relation};

/// Stored user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular user.
    #[sea_orm(string_value = "user")]
    User,
}

impl From<auth::UserRole> for UserRole {
    fn from(role: auth::UserRole) -> Self {
        match role {
            auth::UserRole::Admin => Self::Admin,
            auth::UserRole::User => Self::User,
        }
    }
}

impl From<UserRole> for auth::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::User => Self::User,
        }
    }
}

/// Stored category kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CategoryType {
    /// Income category.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense category.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<records::CategoryType> for CategoryType {
    fn from(kind: records::CategoryType) -> Self {
        match kind {
            records::CategoryType::Income => Self::Income,
            records::CategoryType::Expense => Self::Expense,
        }
    }
}

impl From<CategoryType> for records::CategoryType {
    fn from(kind: CategoryType) -> Self {
        match kind {
            CategoryType::Income => Self::Income,
            CategoryType::Expense => Self::Expense,
        }
    }
}

/// Stored expense relation discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RelatedModel {
    /// Points at `vehicles`.
    #[sea_orm(string_value = "Vehicle")]
    Vehicle,
    /// Points at `employees`.
    #[sea_orm(string_value = "Employee")]
    Employee,
}

impl From<relation::RelatedModel> for RelatedModel {
    fn from(model: relation::RelatedModel) -> Self {
        match model {
            relation::RelatedModel::Vehicle => Self::Vehicle,
            relation::RelatedModel::Employee => Self::Employee,
        }
    }
}

impl From<RelatedModel> for relation::RelatedModel {
    fn from(model: RelatedModel) -> Self {
        match model {
            RelatedModel::Vehicle => Self::Vehicle,
            RelatedModel::Employee => Self::Employee,
        }
    }
}
