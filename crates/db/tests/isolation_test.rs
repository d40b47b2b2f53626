//! Cross-tenant isolation for every company-scoped repository, plus paging
//! over a dated module.

mod common;

use chrono::NaiveDate;
use common::{create_category, create_company, create_customer, setup_db};
use rstest::rstest;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tally_core::listing::{DateRange, ListFilter};
use tally_db::entities::sea_orm_active_enums::CategoryType;
use tally_db::{
    CategoryRepository, CreateEmployeeInput, CreateExpenseInput, CreateFuelInput,
    CreateIncomeInput, CreatePaymentInput, CreateVehicleInput, EmployeeRepository,
    ExpenseRepository, FuelRepository, IncomeRepository, PaymentFilter, PaymentRepository,
    RepositoryError, VehicleRepository,
};
use tally_shared::PageRequest;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Category,
    Employee,
    Vehicle,
    Expense,
    Income,
    Fuel,
    Payment,
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, d).expect("valid date")
}

async fn create_vehicle(db: &DatabaseConnection, company_id: Uuid) -> Uuid {
    VehicleRepository::new(db.clone())
        .create(CreateVehicleInput {
            company_id,
            plate_number: "34 ABC 12".into(),
            brand: None,
            model: None,
            inspection_date: None,
            insurance_date: None,
            driver_id: None,
            is_active: true,
        })
        .await
        .expect("Failed to create vehicle")
        .id
}

/// Creates one record of `kind` owned by `company_id`.
async fn create_record(db: &DatabaseConnection, kind: Kind, company_id: Uuid) -> Uuid {
    match kind {
        Kind::Category => create_category(db, company_id, "Tolls", CategoryType::Expense).await,
        Kind::Employee => {
            EmployeeRepository::new(db.clone())
                .create(CreateEmployeeInput {
                    company_id,
                    full_name: "Ayse Kaya".into(),
                    phone: None,
                    department: None,
                    hire_date: Some(day(1)),
                    termination_date: None,
                    salary: Some(dec!(42000.00)),
                    is_active: true,
                })
                .await
                .expect("Failed to create employee")
                .id
        }
        Kind::Vehicle => create_vehicle(db, company_id).await,
        Kind::Expense => {
            let category_id =
                create_category(db, company_id, "Maintenance", CategoryType::Expense).await;
            ExpenseRepository::new(db.clone())
                .create(CreateExpenseInput {
                    company_id,
                    operation_date: day(2),
                    category_id,
                    amount: dec!(150.00),
                    description: None,
                    related: None,
                })
                .await
                .expect("Failed to create expense")
                .expense
                .id
        }
        Kind::Income => {
            let category_id =
                create_category(db, company_id, "Freight", CategoryType::Income).await;
            let customer_id = create_customer(db, company_id, "Acme").await;
            IncomeRepository::new(db.clone())
                .create(CreateIncomeInput {
                    company_id,
                    customer_id,
                    category_id,
                    unit_count: dec!(3),
                    unit_price: dec!(10.50),
                    operation_date: day(3),
                    is_paid: false,
                    description: None,
                })
                .await
                .expect("Failed to create income")
                .id
        }
        Kind::Fuel => {
            let vehicle_id = create_vehicle(db, company_id).await;
            FuelRepository::new(db.clone())
                .create(CreateFuelInput {
                    company_id,
                    vehicle_id,
                    total_price: dec!(80.00),
                    invoice_number: None,
                    description: None,
                    operation_date: day(4),
                    driver_name: None,
                })
                .await
                .expect("Failed to create fuel record")
                .id
        }
        Kind::Payment => {
            let customer_id = create_customer(db, company_id, "Acme").await;
            PaymentRepository::new(db.clone())
                .create(CreatePaymentInput {
                    company_id,
                    customer_id,
                    amount: dec!(25.00),
                    operation_date: day(5),
                    description: None,
                })
                .await
                .expect("Failed to create payment")
                .id
        }
    }
}

/// Runs find, update and delete for `id` as `company_id`.
async fn touch(
    db: &DatabaseConnection,
    kind: Kind,
    company_id: Uuid,
    id: Uuid,
) -> [Result<(), RepositoryError>; 3] {
    let db = db.clone();
    match kind {
        Kind::Category => {
            let repo = CategoryRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
        Kind::Employee => {
            let repo = EmployeeRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
        Kind::Vehicle => {
            let repo = VehicleRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
        Kind::Expense => {
            let repo = ExpenseRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
        Kind::Income => {
            let repo = IncomeRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
        Kind::Fuel => {
            let repo = FuelRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
        Kind::Payment => {
            let repo = PaymentRepository::new(db);
            [
                repo.find(company_id, id).await.map(drop),
                repo.update(company_id, id, Default::default()).await.map(drop),
                repo.delete(company_id, id).await,
            ]
        }
    }
}

#[rstest]
#[case::category(Kind::Category)]
#[case::employee(Kind::Employee)]
#[case::vehicle(Kind::Vehicle)]
#[case::expense(Kind::Expense)]
#[case::income(Kind::Income)]
#[case::fuel(Kind::Fuel)]
#[case::payment(Kind::Payment)]
#[tokio::test]
async fn test_other_tenant_cannot_reach_record(#[case] kind: Kind) {
    let db = setup_db().await;
    let owner = create_company(&db).await;
    let intruder = create_company(&db).await;
    let id = create_record(&db, kind, owner).await;

    for (operation, result) in ["find", "update", "delete"]
        .into_iter()
        .zip(touch(&db, kind, intruder, id).await)
    {
        assert!(
            matches!(result, Err(RepositoryError::NotFound(_))),
            "{kind:?} {operation} as another company returned {result:?}"
        );
    }

    // The owner still sees it and can remove it
    let [found, updated, deleted] = touch(&db, kind, owner, id).await;
    assert!(found.is_ok(), "{kind:?} find as owner: {found:?}");
    assert!(updated.is_ok(), "{kind:?} update as owner: {updated:?}");
    assert!(deleted.is_ok(), "{kind:?} delete as owner: {deleted:?}");
}

#[tokio::test]
async fn test_payment_pages_follow_date_order() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let repo = PaymentRepository::new(db.clone());
    for d in [3, 1, 5] {
        repo.create(CreatePaymentInput {
            company_id,
            customer_id,
            amount: dec!(10.00),
            operation_date: day(d),
            description: None,
        })
        .await
        .expect("Failed to create payment");
    }
    let filter = ListFilter {
        search: None,
        range: Some(DateRange::new(day(1), day(30)).expect("valid range")),
    };

    let first = repo
        .list(company_id, &filter, &PaymentFilter::default(), &PageRequest::new(Some(1), Some(2)))
        .await
        .expect("page 1");
    assert_eq!(first.total_count, 3);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 2);
    assert!(first.has_next_page);
    assert!(!first.has_previous_page);

    let second = repo
        .list(company_id, &filter, &PaymentFilter::default(), &PageRequest::new(Some(2), Some(2)))
        .await
        .expect("page 2");
    assert_eq!(second.items.len(), 1);
    assert!(!second.has_next_page);
    assert!(second.has_previous_page);

    let mut dates: Vec<NaiveDate> = first
        .items
        .iter()
        .chain(&second.items)
        .map(|p| p.operation_date)
        .collect();
    let listed = dates.clone();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(listed, dates, "payments are listed newest first");
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let repo = PaymentRepository::new(db.clone());
    repo.create(CreatePaymentInput {
        company_id,
        customer_id,
        amount: dec!(10.00),
        operation_date: day(1),
        description: None,
    })
    .await
    .expect("Failed to create payment");

    let page = repo
        .list(
            company_id,
            &ListFilter::default(),
            &PaymentFilter::default(),
            &PageRequest::new(Some(i64::MAX), Some(100)),
        )
        .await
        .expect("huge page number lists without error");
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 1);
    assert!(!page.has_next_page);
}
