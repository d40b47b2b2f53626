//! Database seeder for Tally development and testing.
//!
//! Seeds a demo company, an administrator account and a starter set of
//! income and expense categories. Running it twice is harmless: existing
//! records are left alone.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use sea_orm::DatabaseConnection;
use tally_core::{auth::hash_password, listing::ListFilter};
use tally_db::{
    CategoryRepository, CompanyRepository, CreateCategoryInput, CreateCompanyInput,
    CreateUserInput, RepositoryError, UserRepository,
    entities::sea_orm_active_enums::{CategoryType, UserRole},
};
use tally_shared::{AppConfig, PageRequest};
use tracing::info;
use uuid::Uuid;

const DEMO_COMPANY: &str = "Demo Logistics";
const ADMIN_USERNAME: &str = "admin";
const ADMIN_EMAIL: &str = "admin@tally.local";
const ADMIN_PASSWORD: &str = "change-me-please";

const INCOME_CATEGORIES: [&str; 3] = ["Freight", "Rental", "Other income"];
const EXPENSE_CATEGORIES: [&str; 5] = ["Fuel", "Maintenance", "Salaries", "Insurance", "Tolls"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info".into()),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = tally_db::connect_with(&config.database)
        .await
        .context("failed to connect to database")?;

    seed_admin(&db).await?;
    let company_id = seed_company(&db).await?;
    seed_categories(&db, company_id).await?;

    info!(company_id = %company_id, "seeding complete");
    Ok(())
}

async fn seed_admin(db: &DatabaseConnection) -> anyhow::Result<()> {
    let users = UserRepository::new(db.clone());
    if users.find_by_username(ADMIN_USERNAME).await?.is_some() {
        info!(username = ADMIN_USERNAME, "admin already exists, skipping");
        return Ok(());
    }

    let user = users
        .create(CreateUserInput {
            username: ADMIN_USERNAME.to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: hash_password(ADMIN_PASSWORD)?,
            role: UserRole::Admin,
        })
        .await?;
    info!(user_id = %user.id, username = ADMIN_USERNAME, "created admin user");
    Ok(())
}

async fn seed_company(db: &DatabaseConnection) -> anyhow::Result<Uuid> {
    let companies = CompanyRepository::new(db.clone());
    let existing = companies
        .list(&ListFilter::search(Some(DEMO_COMPANY)), &PageRequest::new(None, None))
        .await?
        .items
        .into_iter()
        .find(|c| c.name == DEMO_COMPANY);
    if let Some(company) = existing {
        info!(company_id = %company.id, "demo company already exists, skipping");
        return Ok(company.id);
    }

    let company = companies
        .create(CreateCompanyInput {
            name: DEMO_COMPANY.to_string(),
            description: Some("Seeded for local development".to_string()),
            is_active: true,
        })
        .await?;
    info!(company_id = %company.id, name = DEMO_COMPANY, "created demo company");
    Ok(company.id)
}

async fn seed_categories(db: &DatabaseConnection, company_id: Uuid) -> anyhow::Result<()> {
    let categories = CategoryRepository::new(db.clone());
    let wanted = INCOME_CATEGORIES
        .iter()
        .map(|name| (*name, CategoryType::Income))
        .chain(
            EXPENSE_CATEGORIES
                .iter()
                .map(|name| (*name, CategoryType::Expense)),
        );

    let mut inserted = 0;
    for (name, category_type) in wanted {
        let result = categories
            .create(CreateCategoryInput {
                company_id,
                name: name.to_string(),
                description: None,
                category_type,
            })
            .await;
        match result {
            Ok(_) => inserted += 1,
            Err(RepositoryError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!(inserted, "seeded categories");
    Ok(())
}
