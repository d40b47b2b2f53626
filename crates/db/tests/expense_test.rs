//! Expense relation and bookkeeping rule tests.

mod common;

use chrono::NaiveDate;
use common::{create_category, create_company, create_customer, setup_db};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tally_core::listing::{DateRange, ListFilter};
use tally_core::relation::{RelatedEntity, RelatedModel, RelationRef};
use tally_db::entities::sea_orm_active_enums::{self, CategoryType};
use tally_db::{
    CreateEmployeeInput, CreateExpenseInput, CreateIncomeInput, CreateVehicleInput,
    CustomerRepository, EmployeeRepository, ExpenseFilter, ExpenseRepository, IncomeRepository,
    RepositoryError, UpdateEmployeeInput, UpdateIncomeInput, VehicleRepository,
};
use tally_shared::PageRequest;
use uuid::Uuid;

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
}

async fn create_vehicle(db: &DatabaseConnection, company_id: Uuid, plate: &str) -> Uuid {
    VehicleRepository::new(db.clone())
        .create(CreateVehicleInput {
            company_id,
            plate_number: plate.to_string(),
            brand: Some("Ford".into()),
            model: Some("Transit".into()),
            inspection_date: None,
            insurance_date: None,
            driver_id: None,
            is_active: true,
        })
        .await
        .expect("Failed to create vehicle")
        .id
}

async fn create_employee(db: &DatabaseConnection, company_id: Uuid, name: &str) -> Uuid {
    EmployeeRepository::new(db.clone())
        .create(CreateEmployeeInput {
            company_id,
            full_name: name.to_string(),
            phone: None,
            department: None,
            hire_date: None,
            termination_date: None,
            salary: None,
            is_active: true,
        })
        .await
        .expect("Failed to create employee")
        .id
}

fn expense(
    company_id: Uuid,
    category_id: Uuid,
    related: Option<RelationRef>,
) -> CreateExpenseInput {
    CreateExpenseInput {
        company_id,
        operation_date: march(10),
        category_id,
        amount: dec!(250.25),
        description: Some("Maintenance".into()),
        related,
    }
}

#[tokio::test]
async fn test_related_projection_has_single_key_per_model() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let category_id = create_category(&db, company_id, "Repairs", CategoryType::Expense).await;
    let vehicle_id = create_vehicle(&db, company_id, "34 abc 12").await;
    let employee_id = create_employee(&db, company_id, "Jane Doe").await;
    let repo = ExpenseRepository::new(db.clone());

    let on_vehicle = repo
        .create(expense(
            company_id,
            category_id,
            Some(RelationRef {
                id: vehicle_id,
                model: RelatedModel::Vehicle,
            }),
        ))
        .await
        .expect("vehicle expense");
    assert_eq!(
        on_vehicle.related,
        Some(RelatedEntity::Vehicle {
            plate_number: "34 ABC 12".into()
        })
    );
    let json = serde_json::to_value(&on_vehicle.related).expect("serialize");
    assert_eq!(json, serde_json::json!({ "plateNumber": "34 ABC 12" }));

    let on_employee = repo
        .create(expense(
            company_id,
            category_id,
            Some(RelationRef {
                id: employee_id,
                model: RelatedModel::Employee,
            }),
        ))
        .await
        .expect("employee expense");
    let json = serde_json::to_value(&on_employee.related).expect("serialize");
    assert_eq!(json, serde_json::json!({ "fullName": "Jane Doe" }));

    let unrelated = repo
        .create(expense(company_id, category_id, None))
        .await
        .expect("plain expense");
    assert!(unrelated.related.is_none());

    let page = repo
        .list(
            company_id,
            &ListFilter::dated(None, DateRange::month_of(march(1))),
            &ExpenseFilter::default(),
            &PageRequest::default(),
        )
        .await
        .expect("list");
    assert_eq!(page.total_count, 3);
    assert_eq!(page.items.iter().filter(|e| e.related.is_some()).count(), 2);
}

#[tokio::test]
async fn test_dangling_relation_resolves_to_none() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let category_id = create_category(&db, company_id, "Repairs", CategoryType::Expense).await;
    let vehicle_id = create_vehicle(&db, company_id, "06 DEF 34").await;
    let repo = ExpenseRepository::new(db.clone());

    let created = repo
        .create(expense(
            company_id,
            category_id,
            Some(RelationRef {
                id: vehicle_id,
                model: RelatedModel::Vehicle,
            }),
        ))
        .await
        .expect("expense");

    // No foreign key guards the polymorphic column
    VehicleRepository::new(db.clone())
        .delete(company_id, vehicle_id)
        .await
        .expect("delete vehicle");

    let found = repo
        .find(company_id, created.expense.id)
        .await
        .expect("expense still readable");
    assert!(found.related.is_none());
    assert_eq!(found.expense.related_id, Some(vehicle_id));
    assert_eq!(
        found.expense.related_model,
        Some(sea_orm_active_enums::RelatedModel::Vehicle)
    );
}

#[tokio::test]
async fn test_relation_target_must_exist_in_tenant() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let other = create_company(&db).await;
    let category_id = create_category(&db, company_id, "Repairs", CategoryType::Expense).await;
    let foreign_vehicle = create_vehicle(&db, other, "35 GHI 56").await;

    let result = ExpenseRepository::new(db.clone())
        .create(expense(
            company_id,
            category_id,
            Some(RelationRef {
                id: foreign_vehicle,
                model: RelatedModel::Vehicle,
            }),
        ))
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound("Vehicle"))));
}

#[tokio::test]
async fn test_category_kind_must_match_usage() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let income_category = create_category(&db, company_id, "Sales", CategoryType::Income).await;

    let result = ExpenseRepository::new(db.clone())
        .create(expense(company_id, income_category, None))
        .await;
    assert!(matches!(result, Err(RepositoryError::Validation(_))));
}

#[tokio::test]
async fn test_income_total_is_computed_and_recomputed() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let category_id = create_category(&db, company_id, "Freight", CategoryType::Income).await;
    let repo = IncomeRepository::new(db.clone());

    let income = repo
        .create(CreateIncomeInput {
            company_id,
            customer_id,
            category_id,
            unit_count: dec!(3),
            unit_price: dec!(50.25),
            operation_date: march(5),
            is_paid: false,
            description: None,
        })
        .await
        .expect("income");
    assert_eq!(income.total_amount, dec!(150.75));

    let updated = repo
        .update(
            company_id,
            income.id,
            UpdateIncomeInput {
                unit_count: Some(dec!(4)),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.total_amount, dec!(201));
    assert_eq!(updated.unit_price, dec!(50.25));
}

#[tokio::test]
async fn test_termination_before_hire_is_rejected_after_merge() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let repo = EmployeeRepository::new(db.clone());

    let employee = repo
        .create(CreateEmployeeInput {
            company_id,
            full_name: "John Smith".into(),
            phone: None,
            department: Some("Logistics".into()),
            hire_date: Some(march(10)),
            termination_date: None,
            salary: Some(dec!(3000)),
            is_active: true,
        })
        .await
        .expect("employee");

    let result = repo
        .update(
            company_id,
            employee.id,
            UpdateEmployeeInput {
                termination_date: Some(Some(march(1))),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::Validation(_))));
}

#[tokio::test]
async fn test_referenced_customer_cannot_be_deleted() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let category_id = create_category(&db, company_id, "Freight", CategoryType::Income).await;

    IncomeRepository::new(db.clone())
        .create(CreateIncomeInput {
            company_id,
            customer_id,
            category_id,
            unit_count: dec!(1),
            unit_price: dec!(10),
            operation_date: march(5),
            is_paid: true,
            description: None,
        })
        .await
        .expect("income");

    let result = CustomerRepository::new(db.clone())
        .delete(company_id, customer_id)
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}
