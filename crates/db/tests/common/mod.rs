//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tally_db::entities::sea_orm_active_enums::CategoryType;
use tally_db::migration::Migrator;
use tally_db::{
    CategoryRepository, CompanyRepository, CreateCategoryInput, CreateCompanyInput,
    CreateCustomerInput, CustomerRepository,
};
use uuid::Uuid;

/// Fresh in-memory database with the schema applied.
///
/// A single pooled connection keeps every query on the same in-memory file.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Creates an active company with a unique name.
pub async fn create_company(db: &DatabaseConnection) -> Uuid {
    CompanyRepository::new(db.clone())
        .create(CreateCompanyInput {
            name: format!("Company {}", Uuid::new_v4()),
            description: None,
            is_active: true,
        })
        .await
        .expect("Failed to create company")
        .id
}

/// Creates a category of the given kind.
pub async fn create_category(
    db: &DatabaseConnection,
    company_id: Uuid,
    name: &str,
    category_type: CategoryType,
) -> Uuid {
    CategoryRepository::new(db.clone())
        .create(CreateCategoryInput {
            company_id,
            name: name.to_string(),
            description: None,
            category_type,
        })
        .await
        .expect("Failed to create category")
        .id
}

/// Creates a customer.
pub async fn create_customer(db: &DatabaseConnection, company_id: Uuid, name: &str) -> Uuid {
    CustomerRepository::new(db.clone())
        .create(CreateCustomerInput {
            company_id,
            name: name.to_string(),
            phone: None,
            description: None,
        })
        .await
        .expect("Failed to create customer")
        .id
}
