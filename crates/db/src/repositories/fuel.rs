//! Fuel purchase repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{ensure_amount, normalize_optional};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{apply_listing, paginate};
use super::vehicle::VehicleRepository;
use crate::entities::{fuels, vehicles};

/// Input for recording a fuel purchase.
#[derive(Debug, Clone)]
pub struct CreateFuelInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Fuelled vehicle.
    pub vehicle_id: Uuid,
    /// Total price paid.
    pub total_price: Decimal,
    /// Invoice number.
    pub invoice_number: Option<String>,
    /// Free text.
    pub description: Option<String>,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Driver at the pump.
    pub driver_name: Option<String>,
}

/// Input for updating a fuel purchase.
#[derive(Debug, Clone, Default)]
pub struct UpdateFuelInput {
    /// New vehicle.
    pub vehicle_id: Option<Uuid>,
    /// New total price.
    pub total_price: Option<Decimal>,
    /// New invoice number.
    pub invoice_number: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New operation date.
    pub operation_date: Option<NaiveDate>,
    /// New driver name.
    pub driver_name: Option<Option<String>>,
}

/// Fuel-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct FuelFilter {
    /// Only this vehicle's purchases.
    pub vehicle_id: Option<Uuid>,
}

/// Fuel repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct FuelRepository {
    db: DatabaseConnection,
}

impl FuelRepository {
    const SEARCH: [fuels::Column; 3] = [
        fuels::Column::InvoiceNumber,
        fuels::Column::DriverName,
        fuels::Column::Description,
    ];

    /// Creates a new fuel repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a fuel purchase.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the vehicle is missing from the tenant.
    pub async fn create(&self, input: CreateFuelInput) -> Result<fuels::Model, RepositoryError> {
        ensure_amount("totalPrice", input.total_price)?;
        VehicleRepository::new(self.db.clone())
            .find(input.company_id, input.vehicle_id)
            .await?;

        let now = chrono::Utc::now().into();
        let fuel = fuels::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            vehicle_id: Set(input.vehicle_id),
            total_price: Set(input.total_price),
            invoice_number: Set(normalize_optional(input.invoice_number)),
            description: Set(normalize_optional(input.description)),
            operation_date: Set(input.operation_date),
            driver_name: Set(normalize_optional(input.driver_name)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let fuel = fuel.insert(&self.db).await?;
        tracing::info!(
            company_id = %fuel.company_id,
            fuel_id = %fuel.id,
            vehicle_id = %fuel.vehicle_id,
            "fuel purchase recorded"
        );
        Ok(fuel)
    }

    /// Lists a tenant's fuel purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        fuel_filter: &FuelFilter,
        page: &PageRequest,
    ) -> Result<PagedList<fuels::Model>, RepositoryError> {
        let select = Self::filtered(company_id, filter, fuel_filter);
        Ok(paginate(&self.db, select, page).await?)
    }

    /// All matching purchases with the vehicle's plate, for spreadsheet export.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        fuel_filter: &FuelFilter,
    ) -> Result<Vec<(fuels::Model, Option<String>)>, RepositoryError> {
        let rows = Self::filtered(company_id, filter, fuel_filter)
            .find_also_related(vehicles::Entity)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(fuel, vehicle)| (fuel, vehicle.map(|v| v.plate_number)))
            .collect())
    }

    /// Finds a tenant's fuel purchase.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(&self, company_id: Uuid, id: Uuid) -> Result<fuels::Model, RepositoryError> {
        fuels::Entity::find_by_id(id)
            .filter(fuels::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Fuel"))
    }

    /// Updates a tenant's fuel purchase.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateFuelInput,
    ) -> Result<fuels::Model, RepositoryError> {
        let fuel = self.find(company_id, id).await?;
        let mut active: fuels::ActiveModel = fuel.into();

        if let Some(total_price) = input.total_price {
            ensure_amount("totalPrice", total_price)?;
            active.total_price = Set(total_price);
        }
        if let Some(vehicle_id) = input.vehicle_id {
            VehicleRepository::new(self.db.clone())
                .find(company_id, vehicle_id)
                .await?;
            active.vehicle_id = Set(vehicle_id);
        }
        if let Some(invoice_number) = input.invoice_number {
            active.invoice_number = Set(normalize_optional(invoice_number));
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        if let Some(operation_date) = input.operation_date {
            active.operation_date = Set(operation_date);
        }
        if let Some(driver_name) = input.driver_name {
            active.driver_name = Set(normalize_optional(driver_name));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, fuel_id = %id, "fuel purchase updated");
        Ok(updated)
    }

    /// Deletes a tenant's fuel purchase.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = fuels::Entity::delete_many()
            .filter(fuels::Column::Id.eq(id))
            .filter(fuels::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Fuel"));
        }
        tracing::info!(company_id = %company_id, fuel_id = %id, "fuel purchase deleted");
        Ok(())
    }

    fn filtered(
        company_id: Uuid,
        filter: &ListFilter,
        fuel_filter: &FuelFilter,
    ) -> Select<fuels::Entity> {
        let mut select = fuels::Entity::find().filter(fuels::Column::CompanyId.eq(company_id));
        if let Some(vehicle_id) = fuel_filter.vehicle_id {
            select = select.filter(fuels::Column::VehicleId.eq(vehicle_id));
        }
        apply_listing(
            select,
            filter,
            &Self::SEARCH,
            Some(fuels::Column::OperationDate),
        )
        .order_by_desc(fuels::Column::OperationDate)
        .order_by_desc(fuels::Column::CreatedAt)
    }
}
