//! Initial database migration.
//!
//! Creates every table with the schema builder so the same migration runs on
//! PostgreSQL and on the SQLite databases used by tests.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // ============================================================
        // PART 1: GLOBAL TABLES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(uuid_pk(Companies::Id))
                    .col(ColumnDef::new(Companies::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Companies::Description).text())
                    .col(
                        ColumnDef::new(Companies::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Companies::CreatedAt))
                    .col(timestamp(Companies::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "uq_companies_name", Companies::Table, &[Companies::Name]).await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid_pk(Users::Id))
                    .col(ColumnDef::new(Users::Username).string_len(64).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "uq_users_username", Users::Table, &[Users::Username]).await?;
        unique_index(manager, "uq_users_email", Users::Table, &[Users::Email]).await?;

        manager
            .create_table(
                Table::create()
                    .table(ErrorLogs::Table)
                    .if_not_exists()
                    .col(uuid_pk(ErrorLogs::Id))
                    .col(ColumnDef::new(ErrorLogs::CompanyId).uuid())
                    .col(ColumnDef::new(ErrorLogs::StatusCode).integer().not_null())
                    .col(ColumnDef::new(ErrorLogs::Message).text().not_null())
                    .col(ColumnDef::new(ErrorLogs::Stack).text())
                    .col(ColumnDef::new(ErrorLogs::Context).string_len(64))
                    .col(ColumnDef::new(ErrorLogs::Path).string_len(512).not_null())
                    .col(ColumnDef::new(ErrorLogs::Method).string_len(16).not_null())
                    .col(timestamp(ErrorLogs::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: TENANT MASTER DATA
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(uuid_pk(Categories::Id))
                    .col(ColumnDef::new(Categories::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Categories::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Categories::Description).text())
                    .col(ColumnDef::new(Categories::CategoryType).string_len(16).not_null())
                    .col(timestamp(Categories::CreatedAt))
                    .col(timestamp(Categories::UpdatedAt))
                    .foreign_key(&mut company_fk(Categories::Table, Categories::CompanyId))
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "uq_categories_company_name",
            Categories::Table,
            &[Categories::CompanyId, Categories::Name],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(uuid_pk(Customers::Id))
                    .col(ColumnDef::new(Customers::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Customers::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Customers::Phone).string_len(32))
                    .col(ColumnDef::new(Customers::Description).text())
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .foreign_key(&mut company_fk(Customers::Table, Customers::CompanyId))
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "uq_customers_company_name",
            Customers::Table,
            &[Customers::CompanyId, Customers::Name],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(uuid_pk(Employees::Id))
                    .col(ColumnDef::new(Employees::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Employees::FullName).string_len(200).not_null())
                    .col(ColumnDef::new(Employees::Phone).string_len(32))
                    .col(ColumnDef::new(Employees::Department).string_len(100))
                    .col(ColumnDef::new(Employees::HireDate).date())
                    .col(ColumnDef::new(Employees::TerminationDate).date())
                    .col(&mut money(backend, Employees::Salary))
                    .col(
                        ColumnDef::new(Employees::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Employees::CreatedAt))
                    .col(timestamp(Employees::UpdatedAt))
                    .foreign_key(&mut company_fk(Employees::Table, Employees::CompanyId))
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "uq_employees_company_full_name",
            Employees::Table,
            &[Employees::CompanyId, Employees::FullName],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(uuid_pk(Vehicles::Id))
                    .col(ColumnDef::new(Vehicles::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Vehicles::PlateNumber).string_len(32).not_null())
                    .col(ColumnDef::new(Vehicles::Brand).string_len(100))
                    .col(ColumnDef::new(Vehicles::Model).string_len(100))
                    .col(ColumnDef::new(Vehicles::InspectionDate).date())
                    .col(ColumnDef::new(Vehicles::InsuranceDate).date())
                    .col(ColumnDef::new(Vehicles::DriverId).uuid())
                    .col(
                        ColumnDef::new(Vehicles::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Vehicles::CreatedAt))
                    .col(timestamp(Vehicles::UpdatedAt))
                    .foreign_key(&mut company_fk(Vehicles::Table, Vehicles::CompanyId))
                    .foreign_key(
                        &mut ForeignKey::create()
                            .name("fk_vehicles_driver")
                            .from(Vehicles::Table, Vehicles::DriverId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "uq_vehicles_company_plate",
            Vehicles::Table,
            &[Vehicles::CompanyId, Vehicles::PlateNumber],
        )
        .await?;

        // ============================================================
        // PART 3: TRANSACTIONS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(uuid_pk(Expenses::Id))
                    .col(ColumnDef::new(Expenses::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::OperationDate).date().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).uuid().not_null())
                    .col(money(backend, Expenses::Amount).not_null())
                    .col(ColumnDef::new(Expenses::Description).text())
                    .col(ColumnDef::new(Expenses::RelatedId).uuid())
                    .col(ColumnDef::new(Expenses::RelatedModel).string_len(16))
                    .col(timestamp(Expenses::CreatedAt))
                    .col(timestamp(Expenses::UpdatedAt))
                    .foreign_key(&mut company_fk(Expenses::Table, Expenses::CompanyId))
                    .foreign_key(
                        &mut ForeignKey::create()
                            .name("fk_expenses_category")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        date_index(
            manager,
            "idx_expenses_company_date",
            Expenses::Table,
            Expenses::CompanyId,
            Expenses::OperationDate,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(uuid_pk(Incomes::Id))
                    .col(ColumnDef::new(Incomes::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Incomes::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Incomes::CategoryId).uuid().not_null())
                    .col(money(backend, Incomes::UnitCount).not_null())
                    .col(money(backend, Incomes::UnitPrice).not_null())
                    .col(money(backend, Incomes::TotalAmount).not_null())
                    .col(ColumnDef::new(Incomes::OperationDate).date().not_null())
                    .col(
                        ColumnDef::new(Incomes::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Incomes::Description).text())
                    .col(timestamp(Incomes::CreatedAt))
                    .col(timestamp(Incomes::UpdatedAt))
                    .foreign_key(&mut company_fk(Incomes::Table, Incomes::CompanyId))
                    .foreign_key(
                        &mut ForeignKey::create()
                            .name("fk_incomes_customer")
                            .from(Incomes::Table, Incomes::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        &mut ForeignKey::create()
                            .name("fk_incomes_category")
                            .from(Incomes::Table, Incomes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        date_index(
            manager,
            "idx_incomes_company_date",
            Incomes::Table,
            Incomes::CompanyId,
            Incomes::OperationDate,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Fuels::Table)
                    .if_not_exists()
                    .col(uuid_pk(Fuels::Id))
                    .col(ColumnDef::new(Fuels::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Fuels::VehicleId).uuid().not_null())
                    .col(money(backend, Fuels::TotalPrice).not_null())
                    .col(ColumnDef::new(Fuels::InvoiceNumber).string_len(64))
                    .col(ColumnDef::new(Fuels::Description).text())
                    .col(ColumnDef::new(Fuels::OperationDate).date().not_null())
                    .col(ColumnDef::new(Fuels::DriverName).string_len(200))
                    .col(timestamp(Fuels::CreatedAt))
                    .col(timestamp(Fuels::UpdatedAt))
                    .foreign_key(&mut company_fk(Fuels::Table, Fuels::CompanyId))
                    .foreign_key(
                        &mut ForeignKey::create()
                            .name("fk_fuels_vehicle")
                            .from(Fuels::Table, Fuels::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        date_index(
            manager,
            "idx_fuels_company_date",
            Fuels::Table,
            Fuels::CompanyId,
            Fuels::OperationDate,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(uuid_pk(Payments::Id))
                    .col(ColumnDef::new(Payments::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Payments::CustomerId).uuid().not_null())
                    .col(money(backend, Payments::Amount).not_null())
                    .col(ColumnDef::new(Payments::OperationDate).date().not_null())
                    .col(ColumnDef::new(Payments::Description).text())
                    .col(timestamp(Payments::CreatedAt))
                    .col(timestamp(Payments::UpdatedAt))
                    .foreign_key(&mut company_fk(Payments::Table, Payments::CompanyId))
                    .foreign_key(
                        &mut ForeignKey::create()
                            .name("fk_payments_customer")
                            .from(Payments::Table, Payments::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        date_index(
            manager,
            "idx_payments_company_date",
            Payments::Table,
            Payments::CompanyId,
            Payments::OperationDate,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse dependency order.
        let tables: [DynIden; 11] = [
            Payments::Table.into_iden(),
            Fuels::Table.into_iden(),
            Incomes::Table.into_iden(),
            Expenses::Table.into_iden(),
            Vehicles::Table.into_iden(),
            Employees::Table.into_iden(),
            Customers::Table.into_iden(),
            Categories::Table.into_iden(),
            ErrorLogs::Table.into_iden(),
            Users::Table.into_iden(),
            Companies::Table.into_iden(),
        ];
        for table in tables {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn uuid_pk(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// Money column: `NUMERIC(14,2)` on PostgreSQL, `REAL` on SQLite.
fn money(backend: DatabaseBackend, col: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    match backend {
        DatabaseBackend::Sqlite => def.double(),
        _ => def.decimal_len(14, 2),
    };
    def
}

fn company_fk(table: impl IntoIden, col: impl IntoIden) -> ForeignKeyCreateStatement {
    let table = table.into_iden();
    let table_name = table.to_string();
    ForeignKey::create()
        .name(format!("fk_{table_name}_company"))
        .from(table, col)
        .to(Companies::Table, Companies::Id)
        .on_delete(ForeignKeyAction::Restrict)
        .to_owned()
}

async fn unique_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    cols: &[C],
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + Copy + 'static,
{
    let mut index = Index::create();
    index.name(name).table(table).unique().if_not_exists();
    for col in cols {
        index.col(*col);
    }
    manager.create_index(index.to_owned()).await
}

async fn date_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    company: C,
    date: C,
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(table)
                .col(company)
                .col(date)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden, Clone, Copy)]
enum Companies {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum ErrorLogs {
    Table,
    Id,
    CompanyId,
    StatusCode,
    Message,
    Stack,
    Context,
    Path,
    Method,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Categories {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
    CategoryType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Customers {
    Table,
    Id,
    CompanyId,
    Name,
    Phone,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Employees {
    Table,
    Id,
    CompanyId,
    FullName,
    Phone,
    Department,
    HireDate,
    TerminationDate,
    Salary,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Vehicles {
    Table,
    Id,
    CompanyId,
    PlateNumber,
    Brand,
    Model,
    InspectionDate,
    InsuranceDate,
    DriverId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Expenses {
    Table,
    Id,
    CompanyId,
    OperationDate,
    CategoryId,
    Amount,
    Description,
    RelatedId,
    RelatedModel,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Incomes {
    Table,
    Id,
    CompanyId,
    CustomerId,
    CategoryId,
    UnitCount,
    UnitPrice,
    TotalAmount,
    OperationDate,
    IsPaid,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Fuels {
    Table,
    Id,
    CompanyId,
    VehicleId,
    TotalPrice,
    InvoiceNumber,
    Description,
    OperationDate,
    DriverName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Payments {
    Table,
    Id,
    CompanyId,
    CustomerId,
    Amount,
    OperationDate,
    Description,
    CreatedAt,
    UpdatedAt,
}
