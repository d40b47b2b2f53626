//! Schema migration tests.

mod common;

use common::{create_category, create_company, setup_db};
use sea_orm_migration::MigratorTrait;
use tally_db::entities::sea_orm_active_enums::CategoryType;
use tally_db::migration::Migrator;

#[tokio::test]
async fn test_schema_rolls_back_and_reapplies() {
    let db = setup_db().await;
    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());

    Migrator::down(&db, None).await.expect("rollback");
    assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 1);

    Migrator::up(&db, None).await.expect("reapply");
    let company_id = create_company(&db).await;
    create_category(&db, company_id, "Fuel", CategoryType::Expense).await;
}

