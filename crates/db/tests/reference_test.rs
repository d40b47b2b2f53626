//! Delete and retype guards for records other rows point at, and money bounds.

mod common;

use chrono::NaiveDate;
use common::{create_category, create_company, create_customer, setup_db};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tally_db::entities::sea_orm_active_enums::CategoryType;
use tally_db::{
    CategoryRepository, CompanyRepository, CreateEmployeeInput, CreateFuelInput,
    CreateIncomeInput, CreatePaymentInput, CreateVehicleInput, EmployeeRepository, FuelRepository,
    IncomeRepository, PaymentRepository, RepositoryError, UpdateCategoryInput,
    UpdateIncomeInput, VehicleRepository,
};
use uuid::Uuid;

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

async fn create_vehicle(db: &DatabaseConnection, company_id: Uuid, driver_id: Option<Uuid>) -> Uuid {
    VehicleRepository::new(db.clone())
        .create(CreateVehicleInput {
            company_id,
            plate_number: "06 TR 451".into(),
            brand: None,
            model: None,
            inspection_date: None,
            insurance_date: None,
            driver_id,
            is_active: true,
        })
        .await
        .expect("Failed to create vehicle")
        .id
}

async fn create_income(
    db: &DatabaseConnection,
    company_id: Uuid,
    customer_id: Uuid,
    category_id: Uuid,
) -> Uuid {
    IncomeRepository::new(db.clone())
        .create(CreateIncomeInput {
            company_id,
            customer_id,
            category_id,
            unit_count: dec!(2),
            unit_price: dec!(12.50),
            operation_date: june(2),
            is_paid: false,
            description: None,
        })
        .await
        .expect("Failed to create income")
        .id
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let used = create_category(&db, company_id, "Freight", CategoryType::Income).await;
    let unused = create_category(&db, company_id, "Rental", CategoryType::Income).await;
    create_income(&db, company_id, customer_id, used).await;

    let repo = CategoryRepository::new(db.clone());
    let result = repo.delete(company_id, used).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    repo.find(company_id, used).await.expect("still there");

    repo.delete(company_id, unused)
        .await
        .expect("unused category deletes");
}

#[tokio::test]
async fn test_customer_with_payments_cannot_be_deleted() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    PaymentRepository::new(db.clone())
        .create(CreatePaymentInput {
            company_id,
            customer_id,
            amount: dec!(40.00),
            operation_date: june(3),
            description: None,
        })
        .await
        .expect("payment");

    let result = tally_db::CustomerRepository::new(db.clone())
        .delete(company_id, customer_id)
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
async fn test_vehicle_with_fuel_records_cannot_be_deleted() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let vehicle_id = create_vehicle(&db, company_id, None).await;
    let fuel = FuelRepository::new(db.clone())
        .create(CreateFuelInput {
            company_id,
            vehicle_id,
            total_price: dec!(95.00),
            invoice_number: Some("F-1".into()),
            description: None,
            operation_date: june(4),
            driver_name: None,
        })
        .await
        .expect("fuel");

    let vehicles = VehicleRepository::new(db.clone());
    let result = vehicles.delete(company_id, vehicle_id).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    FuelRepository::new(db.clone())
        .delete(company_id, fuel.id)
        .await
        .expect("fuel deletes");
    vehicles
        .delete(company_id, vehicle_id)
        .await
        .expect("vehicle deletes once its fuel records are gone");
}

#[tokio::test]
async fn test_assigned_driver_cannot_be_deleted() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let employees = EmployeeRepository::new(db.clone());
    let driver = employees
        .create(CreateEmployeeInput {
            company_id,
            full_name: "Mehmet Demir".into(),
            phone: None,
            department: Some("Logistics".into()),
            hire_date: None,
            termination_date: None,
            salary: None,
            is_active: true,
        })
        .await
        .expect("employee");
    create_vehicle(&db, company_id, Some(driver.id)).await;

    let result = employees.delete(company_id, driver.id).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
async fn test_company_with_records_cannot_be_deleted() {
    let db = setup_db().await;
    let busy = create_company(&db).await;
    let empty = create_company(&db).await;
    create_customer(&db, busy, "Acme").await;

    let companies = CompanyRepository::new(db.clone());
    let result = companies.delete(busy).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    companies.delete(empty).await.expect("empty company deletes");
    assert!(matches!(
        companies.find(empty).await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_category_kind_is_locked_while_in_use() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let used = create_category(&db, company_id, "Freight", CategoryType::Income).await;
    let unused = create_category(&db, company_id, "Misc", CategoryType::Income).await;
    create_income(&db, company_id, customer_id, used).await;

    let repo = CategoryRepository::new(db.clone());
    let retype = || UpdateCategoryInput {
        category_type: Some(CategoryType::Expense),
        ..Default::default()
    };

    let result = repo.update(company_id, used, retype()).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    let category = repo.find(company_id, used).await.expect("category");
    assert_eq!(category.category_type, CategoryType::Income);

    // Renaming a used category is still fine
    let renamed = repo
        .update(
            company_id,
            used,
            UpdateCategoryInput {
                name: Some("Freight (domestic)".into()),
                category_type: Some(CategoryType::Income),
                ..Default::default()
            },
        )
        .await
        .expect("same kind keeps working");
    assert_eq!(renamed.name, "Freight (domestic)");

    let retyped = repo
        .update(company_id, unused, retype())
        .await
        .expect("unused category can change kind");
    assert_eq!(retyped.category_type, CategoryType::Expense);
}

#[tokio::test]
async fn test_income_total_beyond_money_range_is_rejected() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let category_id = create_category(&db, company_id, "Freight", CategoryType::Income).await;
    let repo = IncomeRepository::new(db.clone());

    let result = repo
        .create(CreateIncomeInput {
            company_id,
            customer_id,
            category_id,
            unit_count: dec!(999999999999),
            unit_price: dec!(999999999999),
            operation_date: june(5),
            is_paid: false,
            description: None,
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::Validation(_))));

    let income_id = create_income(&db, company_id, customer_id, category_id).await;
    let result = repo
        .update(
            company_id,
            income_id,
            UpdateIncomeInput {
                unit_count: Some(dec!(79228162514264337593543950335)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::Validation(_))));
    let income = repo.find(company_id, income_id).await.expect("income");
    assert_eq!(income.total_amount, dec!(25.00));
}
