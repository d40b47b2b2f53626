//! Tenant isolation, uniqueness and listing tests.

mod common;

use chrono::NaiveDate;
use common::{create_company, create_customer, setup_db};
use rust_decimal_macros::dec;
use tally_core::listing::{DateRange, ListFilter};
use tally_db::{
    CreateCustomerInput, CreatePaymentInput, CreateVehicleInput, CustomerRepository,
    PaymentFilter, PaymentRepository, RepositoryError, UpdateCustomerInput, VehicleRepository,
};
use tally_shared::PageRequest;

#[tokio::test]
async fn test_record_of_other_tenant_is_not_found() {
    let db = setup_db().await;
    let owner = create_company(&db).await;
    let intruder = create_company(&db).await;
    let customer_id = create_customer(&db, owner, "Acme Logistics").await;

    let repo = CustomerRepository::new(db.clone());

    let found = repo.find(intruder, customer_id).await;
    assert!(matches!(found, Err(RepositoryError::NotFound("Customer"))));

    let updated = repo
        .update(
            intruder,
            customer_id,
            UpdateCustomerInput {
                name: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(updated, Err(RepositoryError::NotFound(_))));

    let deleted = repo.delete(intruder, customer_id).await;
    assert!(matches!(deleted, Err(RepositoryError::NotFound(_))));

    // Untouched for the owner
    let customer = repo.find(owner, customer_id).await.expect("owner can read");
    assert_eq!(customer.name, "Acme Logistics");
}

#[tokio::test]
async fn test_list_only_returns_own_records() {
    let db = setup_db().await;
    let first = create_company(&db).await;
    let second = create_company(&db).await;
    create_customer(&db, first, "Alpha").await;
    create_customer(&db, first, "Beta").await;
    create_customer(&db, second, "Gamma").await;

    let repo = CustomerRepository::new(db.clone());
    let page = repo
        .list(first, &ListFilter::default(), &PageRequest::default())
        .await
        .expect("Failed to list customers");

    assert_eq!(page.total_count, 2);
    assert!(page.items.iter().all(|c| c.company_id == first));
}

#[tokio::test]
async fn test_duplicate_name_conflicts_within_tenant_only() {
    let db = setup_db().await;
    let first = create_company(&db).await;
    let second = create_company(&db).await;
    let repo = CustomerRepository::new(db.clone());

    create_customer(&db, first, "Acme").await;

    let duplicate = repo
        .create(CreateCustomerInput {
            company_id: first,
            name: "  Acme ".into(),
            phone: None,
            description: None,
        })
        .await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    let other_tenant = repo
        .create(CreateCustomerInput {
            company_id: second,
            name: "Acme".into(),
            phone: None,
            description: None,
        })
        .await;
    assert!(other_tenant.is_ok());
}

#[tokio::test]
async fn test_plate_is_normalized_before_uniqueness_check() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let repo = VehicleRepository::new(db.clone());

    let input = |plate: &str| CreateVehicleInput {
        company_id,
        plate_number: plate.to_string(),
        brand: None,
        model: None,
        inspection_date: None,
        insurance_date: None,
        driver_id: None,
        is_active: true,
    };

    let vehicle = repo.create(input(" 34 abc 123 ")).await.expect("create");
    assert_eq!(vehicle.plate_number, "34 ABC 123");

    let duplicate = repo.create(input("34 Abc 123")).await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
async fn test_unknown_driver_is_rejected() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;

    let result = VehicleRepository::new(db.clone())
        .create(CreateVehicleInput {
            company_id,
            plate_number: "06 XYZ 01".into(),
            brand: None,
            model: None,
            inspection_date: None,
            insurance_date: None,
            driver_id: Some(uuid::Uuid::new_v4()),
            is_active: true,
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound("Driver"))));
}

#[tokio::test]
async fn test_pagination_flags() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    for i in 0..5 {
        create_customer(&db, company_id, &format!("Customer {i}")).await;
    }
    let repo = CustomerRepository::new(db.clone());

    let first = repo
        .list(company_id, &ListFilter::default(), &PageRequest::new(Some(1), Some(2)))
        .await
        .expect("page 1");
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total_pages, 3);
    assert!(!first.has_previous_page);
    assert!(first.has_next_page);

    let last = repo
        .list(company_id, &ListFilter::default(), &PageRequest::new(Some(3), Some(2)))
        .await
        .expect("page 3");
    assert_eq!(last.items.len(), 1);
    assert!(last.has_previous_page);
    assert!(!last.has_next_page);
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_escapes_wildcards() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    create_customer(&db, company_id, "Blue Harbor Freight").await;
    create_customer(&db, company_id, "100% Organic").await;
    create_customer(&db, company_id, "Redline").await;
    let repo = CustomerRepository::new(db.clone());

    let page = repo
        .list(company_id, &ListFilter::search(Some("HARBOR")), &PageRequest::default())
        .await
        .expect("search");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].name, "Blue Harbor Freight");

    let page = repo
        .list(company_id, &ListFilter::search(Some("0%")), &PageRequest::default())
        .await
        .expect("search");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].name, "100% Organic");
}

#[tokio::test]
async fn test_date_range_includes_both_bounds() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id, "Acme").await;
    let repo = PaymentRepository::new(db.clone());

    let date = |d: u32| NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date");
    for day in [1, 15, 31] {
        repo.create(CreatePaymentInput {
            company_id,
            customer_id,
            amount: dec!(100),
            operation_date: date(day),
            description: None,
        })
        .await
        .expect("payment");
    }
    repo.create(CreatePaymentInput {
        company_id,
        customer_id,
        amount: dec!(100),
        operation_date: NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
        description: None,
    })
    .await
    .expect("payment");

    let range = DateRange::month_of(date(10));
    let page = repo
        .list(
            company_id,
            &ListFilter::dated(None, range),
            &PaymentFilter::default(),
            &PageRequest::default(),
        )
        .await
        .expect("list");

    assert_eq!(page.total_count, 3);
    // Newest first
    assert_eq!(page.items[0].operation_date, date(31));
    assert_eq!(page.items[2].operation_date, date(1));
}
