//! Tests for report aggregation.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::locale::MonthLocale;
use super::service::ReportService;
use super::types::{CategoryFact, DatedAmount, IncomeFact, PaymentFact};
use crate::listing::DateRange;
use crate::records::CategoryType;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn income(customer_id: Uuid, is_paid: bool, amount: Decimal, count: u64) -> IncomeFact {
    IncomeFact {
        customer_id,
        is_paid,
        amount,
        count,
    }
}

fn paid_by(customer_id: Uuid, amount: Decimal) -> PaymentFact {
    PaymentFact {
        customer_id,
        amount,
    }
}

fn dated(date: NaiveDate, amount: Decimal) -> DatedAmount {
    DatedAmount { date, amount }
}

#[test]
fn test_empty_year_has_twelve_zero_months() {
    let report = ReportService::monthly_report(2023, MonthLocale::En, &[], &[], &[]);

    assert_eq!(report.year, 2023);
    assert_eq!(report.months.len(), 12);
    for (i, entry) in report.months.iter().enumerate() {
        assert_eq!(entry.month as usize, i + 1);
        assert_eq!(entry.income, Decimal::ZERO);
        assert_eq!(entry.total_cost, Decimal::ZERO);
        assert_eq!(entry.net_profit, Decimal::ZERO);
        assert_eq!(entry.profit_margin, Decimal::ZERO);
    }
    assert_eq!(report.months[0].month_name, "January");
    assert_eq!(report.months[11].month_name, "December");
    assert_eq!(report.totals.income, Decimal::ZERO);
}

#[test]
fn test_empty_year_turkish_month_names() {
    let report = ReportService::monthly_report(2023, MonthLocale::Tr, &[], &[], &[]);
    let names: Vec<&str> = report.months.iter().map(|m| m.month_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül",
            "Ekim", "Kasım", "Aralık"
        ]
    );
}

#[test]
fn test_monthly_report_figures() {
    let incomes = [
        dated(d(2024, 3, 1), dec!(1000)),
        dated(d(2024, 3, 31), dec!(500)),
        dated(d(2023, 3, 15), dec!(9999)),
    ];
    let expenses = [dated(d(2024, 3, 10), dec!(300)), dated(d(2024, 4, 2), dec!(50))];
    let fuels = [dated(d(2024, 3, 12), dec!(200))];

    let report = ReportService::monthly_report(2024, MonthLocale::En, &incomes, &expenses, &fuels);

    let march = &report.months[2];
    assert_eq!(march.month_name, "March");
    assert_eq!(march.income, dec!(1500));
    assert_eq!(march.expense, dec!(300));
    assert_eq!(march.fuel, dec!(200));
    assert_eq!(march.total_cost, dec!(500));
    assert_eq!(march.net_profit, dec!(1000));
    assert_eq!(march.profit_margin, dec!(66.67));

    let april = &report.months[3];
    assert_eq!(april.net_profit, dec!(-50));
    assert_eq!(april.profit_margin, Decimal::ZERO);

    assert_eq!(report.totals.income, dec!(1500));
    assert_eq!(report.totals.total_cost, dec!(550));
    assert_eq!(report.totals.net_profit, dec!(950));
    assert_eq!(report.totals.profit_margin, dec!(63.33));
}

#[test]
fn test_customer_report() {
    let acme = Uuid::new_v4();
    let globex = Uuid::new_v4();
    let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let names = HashMap::from([(acme, "Acme".to_string()), (globex, "Globex".to_string())]);

    let incomes = [
        income(acme, true, dec!(400), 1),
        income(acme, false, dec!(600), 1),
        income(globex, false, dec!(2000), 3),
    ];
    let payments = [paid_by(acme, dec!(1000)), paid_by(globex, dec!(500))];

    let report = ReportService::customer_report(range, &incomes, &payments, &names);

    assert_eq!(report.customers.len(), 2);
    let first = &report.customers[0];
    assert_eq!(first.customer_name, "Globex");
    assert_eq!(first.total_income, dec!(2000));
    assert_eq!(first.remaining_receivable, dec!(1500));
    assert_eq!(first.payment_rate, dec!(25));
    assert_eq!(first.invoice_count, 3);
    assert!(!first.is_fully_paid);

    let second = &report.customers[1];
    assert_eq!(second.customer_name, "Acme");
    assert_eq!(second.invoice_count, 2);
    assert_eq!(second.paid_invoice_count, 1);
    assert_eq!(second.paid_income, dec!(400));
    assert_eq!(second.remaining_receivable, Decimal::ZERO);
    assert_eq!(second.payment_rate, dec!(100));
    assert!(second.is_fully_paid);

    assert_eq!(report.totals.total_income, dec!(3000));
    assert_eq!(report.totals.total_payments, dec!(1500));
    assert_eq!(report.totals.payment_rate, dec!(50));
    assert_eq!(report.totals.invoice_count, 5);
    assert_eq!(report.begin_date, d(2024, 1, 1));
}

#[test]
fn test_customer_with_only_payments_has_zero_rate() {
    let customer = Uuid::new_v4();
    let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let payments = [paid_by(customer, dec!(100))];

    let report = ReportService::customer_report(range, &[], &payments, &HashMap::new());

    assert_eq!(report.customers.len(), 1);
    assert_eq!(report.customers[0].payment_rate, Decimal::ZERO);
    assert_eq!(report.customers[0].remaining_receivable, dec!(-100));
    assert!(!report.customers[0].is_fully_paid);
}

#[test]
fn test_category_breakdown_shares() {
    let fuel = Uuid::new_v4();
    let rent = Uuid::new_v4();
    let range = DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
    let names = HashMap::from([(fuel, "Fuel".to_string()), (rent, "Rent".to_string())]);
    let facts = [
        CategoryFact {
            category_id: rent,
            amount: dec!(500),
            count: 2,
        },
        CategoryFact {
            category_id: fuel,
            amount: dec!(100),
            count: 1,
        },
    ];

    let report =
        ReportService::category_breakdown(CategoryType::Expense, range, &facts, &names);

    assert_eq!(report.total, dec!(600));
    assert_eq!(report.categories[0].category_name, "Rent");
    assert_eq!(report.categories[0].count, 2);
    assert_eq!(report.categories[0].share, dec!(83.33));
    assert_eq!(report.categories[1].share, dec!(16.67));
}

#[test]
fn test_summary() {
    let acme = Uuid::new_v4();
    let globex = Uuid::new_v4();
    let range = DateRange::new(d(2024, 5, 1), d(2024, 5, 31)).unwrap();
    let incomes = [
        income(acme, true, dec!(500), 2),
        income(globex, true, dec!(300), 1),
        income(globex, false, dec!(200), 1),
    ];
    let payments = [paid_by(acme, dec!(400)), paid_by(globex, dec!(300))];

    let summary = ReportService::summary(range, &incomes, dec!(150), dec!(50), &payments);

    assert_eq!(summary.total_income, dec!(1000));
    assert_eq!(summary.paid_income, dec!(800));
    assert_eq!(summary.unpaid_income, dec!(200));
    assert_eq!(summary.total_expense, dec!(150));
    assert_eq!(summary.total_fuel, dec!(50));
    assert_eq!(summary.total_payments, dec!(700));
    assert_eq!(summary.net_profit, dec!(800));
    assert_eq!(summary.profit_margin, dec!(80));
}

#[test]
fn test_percentage_of_zero_is_zero() {
    assert_eq!(ReportService::percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
}

proptest! {
    /// Net profit always equals income minus expense and fuel, per month and in total.
    #[test]
    fn prop_monthly_net_profit_identity(
        amounts in prop::collection::vec((1u32..=12, 0i64..1_000_000, 0u8..3), 0..60),
    ) {
        let mut incomes = Vec::new();
        let mut expenses = Vec::new();
        let mut fuels = Vec::new();
        for (month, cents, kind) in amounts {
            let date = d(2024, month, 15);
            let amount = Decimal::new(cents, 2);
            match kind {
                0 => incomes.push(dated(date, amount)),
                1 => expenses.push(dated(date, amount)),
                _ => fuels.push(dated(date, amount)),
            }
        }

        let report = ReportService::monthly_report(2024, MonthLocale::En, &incomes, &expenses, &fuels);

        prop_assert_eq!(report.months.len(), 12);
        for m in &report.months {
            prop_assert_eq!(m.total_cost, m.expense + m.fuel);
            prop_assert_eq!(m.net_profit, m.income - m.total_cost);
        }
        let income_sum: Decimal = report.months.iter().map(|m| m.income).sum();
        prop_assert_eq!(report.totals.income, income_sum);
        prop_assert_eq!(report.totals.net_profit, report.totals.income - report.totals.total_cost);
    }
}
