//! Report repository tests.

mod common;

use chrono::NaiveDate;
use common::{create_category, create_company, create_customer, setup_db};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::listing::DateRange;
use tally_core::records;
use tally_core::reports::MonthLocale;
use tally_db::entities::sea_orm_active_enums::CategoryType;
use tally_db::{
    CreateExpenseInput, CreateIncomeInput, CreatePaymentInput, ExpenseRepository,
    IncomeRepository, PaymentRepository, ReportRepository,
};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

#[tokio::test]
async fn test_monthly_report_without_transactions_has_twelve_zero_months() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;

    let report = ReportRepository::new(db.clone())
        .monthly(company_id, 2024, MonthLocale::Tr)
        .await
        .expect("report");

    assert_eq!(report.year, 2024);
    assert_eq!(report.months.len(), 12);
    assert!(report.months.iter().all(|m| m.income.is_zero()
        && m.total_cost.is_zero()
        && m.net_profit.is_zero()
        && m.profit_margin.is_zero()));
    assert_eq!(report.months[0].month_name, "Ocak");
    assert_eq!(report.months[11].month_name, "Aralık");
}

#[tokio::test]
async fn test_reports_aggregate_tenant_facts() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let other = create_company(&db).await;
    let acme = create_customer(&db, company_id, "Acme").await;
    let globex = create_customer(&db, company_id, "Globex").await;
    let freight = create_category(&db, company_id, "Freight", CategoryType::Income).await;
    let repairs = create_category(&db, company_id, "Repairs", CategoryType::Expense).await;
    let rent = create_category(&db, company_id, "Rent", CategoryType::Expense).await;

    let incomes = IncomeRepository::new(db.clone());
    for (customer_id, price, paid) in [(acme, dec!(400), true), (globex, dec!(100), false)] {
        incomes
            .create(CreateIncomeInput {
                company_id,
                customer_id,
                category_id: freight,
                unit_count: dec!(1),
                unit_price: price,
                operation_date: date(3, 5),
                is_paid: paid,
                description: None,
            })
            .await
            .expect("income");
    }

    let expenses = ExpenseRepository::new(db.clone());
    for (category_id, amount) in [(repairs, dec!(75)), (rent, dec!(25))] {
        expenses
            .create(CreateExpenseInput {
                company_id,
                operation_date: date(3, 20),
                category_id,
                amount,
                description: None,
                related: None,
            })
            .await
            .expect("expense");
    }

    PaymentRepository::new(db.clone())
        .create(CreatePaymentInput {
            company_id,
            customer_id: acme,
            amount: dec!(400),
            operation_date: date(3, 25),
            description: None,
        })
        .await
        .expect("payment");

    // Another tenant's data never leaks into the figures
    let intruder = create_customer(&db, other, "Initech").await;
    PaymentRepository::new(db.clone())
        .create(CreatePaymentInput {
            company_id: other,
            customer_id: intruder,
            amount: dec!(999),
            operation_date: date(3, 25),
            description: None,
        })
        .await
        .expect("payment");

    let reports = ReportRepository::new(db.clone());

    let monthly = reports
        .monthly(company_id, 2025, MonthLocale::En)
        .await
        .expect("monthly");
    let march = &monthly.months[2];
    assert_eq!(march.month_name, "March");
    assert_eq!(march.income, dec!(500));
    assert_eq!(march.expense, dec!(100));
    assert_eq!(march.net_profit, dec!(400));
    assert_eq!(march.profit_margin, dec!(80));

    let range = DateRange::month_of(date(3, 1));
    let customers = reports.customers(company_id, range).await.expect("customers");
    assert_eq!(customers.customers.len(), 2);
    assert_eq!(customers.customers[0].customer_name, "Acme");
    assert!(customers.customers[0].is_fully_paid);
    assert_eq!(customers.customers[1].remaining_receivable, dec!(100));
    assert_eq!(customers.totals.total_payments, dec!(400));

    let breakdown = reports
        .categories(company_id, records::CategoryType::Expense, range)
        .await
        .expect("categories");
    assert_eq!(breakdown.total, dec!(100));
    assert_eq!(breakdown.categories[0].category_name, "Repairs");
    assert_eq!(breakdown.categories[0].share, dec!(75));

    let summary = reports.summary(company_id, range).await.expect("summary");
    assert_eq!(summary.total_income, dec!(500));
    assert_eq!(summary.paid_income, dec!(400));
    assert_eq!(summary.unpaid_income, dec!(100));
    assert_eq!(summary.total_payments, dec!(400));
    assert_eq!(summary.total_fuel, Decimal::ZERO);
    assert_eq!(summary.net_profit, dec!(400));
}

#[tokio::test]
async fn test_grouped_sums_count_every_invoice() {
    let db = setup_db().await;
    let company_id = create_company(&db).await;
    let acme = create_customer(&db, company_id, "Acme").await;
    let freight = create_category(&db, company_id, "Freight", CategoryType::Income).await;

    let incomes = IncomeRepository::new(db.clone());
    for (day, price, paid) in [
        (3, dec!(10.10), true),
        (3, dec!(10.10), true),
        (4, dec!(10.10), false),
        (17, dec!(0.20), false),
    ] {
        incomes
            .create(CreateIncomeInput {
                company_id,
                customer_id: acme,
                category_id: freight,
                unit_count: dec!(1),
                unit_price: price,
                operation_date: date(6, day),
                is_paid: paid,
                description: None,
            })
            .await
            .expect("income");
    }

    let reports = ReportRepository::new(db.clone());
    let range = DateRange::month_of(date(6, 1));

    let customers = reports.customers(company_id, range).await.expect("customers");
    let row = &customers.customers[0];
    assert_eq!(row.invoice_count, 4);
    assert_eq!(row.paid_invoice_count, 2);
    assert_eq!(row.total_income, dec!(30.50));
    assert_eq!(row.paid_income, dec!(20.20));

    let breakdown = reports
        .categories(company_id, records::CategoryType::Income, range)
        .await
        .expect("categories");
    assert_eq!(breakdown.categories.len(), 1);
    assert_eq!(breakdown.categories[0].count, 4);
    assert_eq!(breakdown.total, dec!(30.50));

    let monthly = reports
        .monthly(company_id, 2025, MonthLocale::En)
        .await
        .expect("monthly");
    assert_eq!(monthly.months[5].income, dec!(30.50));
    assert_eq!(monthly.totals.income, dec!(30.50));
}
