//! Vehicle repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{normalize_optional, normalize_plate};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{apply_listing, count_references, paginate};
use crate::entities::{employees, fuels, vehicles};

/// Input for creating a vehicle.
#[derive(Debug, Clone)]
pub struct CreateVehicleInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Licence plate, unique within the tenant.
    pub plate_number: String,
    /// Make.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Next inspection.
    pub inspection_date: Option<NaiveDate>,
    /// Insurance renewal.
    pub insurance_date: Option<NaiveDate>,
    /// Assigned driver.
    pub driver_id: Option<Uuid>,
    /// Whether the vehicle is in service.
    pub is_active: bool,
}

/// Input for updating a vehicle.
#[derive(Debug, Clone, Default)]
pub struct UpdateVehicleInput {
    /// New plate.
    pub plate_number: Option<String>,
    /// New make.
    pub brand: Option<Option<String>>,
    /// New model.
    pub model: Option<Option<String>>,
    /// New inspection date.
    pub inspection_date: Option<Option<NaiveDate>>,
    /// New insurance date.
    pub insurance_date: Option<Option<NaiveDate>>,
    /// New driver; `Some(None)` unassigns.
    pub driver_id: Option<Option<Uuid>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Vehicle-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    /// Only vehicles in (or out of) service.
    pub is_active: Option<bool>,
}

/// Vehicle repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    db: DatabaseConnection,
}

impl VehicleRepository {
    const SEARCH: [vehicles::Column; 3] = [
        vehicles::Column::PlateNumber,
        vehicles::Column::Brand,
        vehicles::Column::Model,
    ];

    /// Creates a new vehicle repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown driver and `Conflict` if the plate
    /// is taken within the tenant.
    pub async fn create(
        &self,
        input: CreateVehicleInput,
    ) -> Result<vehicles::Model, RepositoryError> {
        let plate_number = normalize_plate(&input.plate_number);
        self.ensure_plate_free(input.company_id, &plate_number, None)
            .await?;
        if let Some(driver_id) = input.driver_id {
            self.ensure_driver(input.company_id, driver_id).await?;
        }

        let now = chrono::Utc::now().into();
        let vehicle = vehicles::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            plate_number: Set(plate_number),
            brand: Set(normalize_optional(input.brand)),
            model: Set(normalize_optional(input.model)),
            inspection_date: Set(input.inspection_date),
            insurance_date: Set(input.insurance_date),
            driver_id: Set(input.driver_id),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let vehicle = vehicle.insert(&self.db).await?;
        tracing::info!(
            company_id = %vehicle.company_id,
            vehicle_id = %vehicle.id,
            plate_number = %vehicle.plate_number,
            "vehicle created"
        );
        Ok(vehicle)
    }

    /// Lists a tenant's vehicles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        vehicle_filter: &VehicleFilter,
        page: &PageRequest,
    ) -> Result<PagedList<vehicles::Model>, RepositoryError> {
        let mut select =
            vehicles::Entity::find().filter(vehicles::Column::CompanyId.eq(company_id));
        if let Some(is_active) = vehicle_filter.is_active {
            select = select.filter(vehicles::Column::IsActive.eq(is_active));
        }
        let select = apply_listing(select, filter, &Self::SEARCH, None)
            .order_by_desc(vehicles::Column::CreatedAt)
            .order_by_desc(vehicles::Column::Id);

        Ok(paginate(&self.db, select, page).await?)
    }

    /// Finds a tenant's vehicle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(&self, company_id: Uuid, id: Uuid) -> Result<vehicles::Model, RepositoryError> {
        vehicles::Entity::find_by_id(id)
            .filter(vehicles::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Vehicle"))
    }

    /// Fetches `(id, plate_number)` for the given vehicles of a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn plate_numbers(
        &self,
        company_id: Uuid,
        ids: Vec<Uuid>,
    ) -> Result<Vec<(Uuid, String)>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vehicles::Entity::find()
            .select_only()
            .column(vehicles::Column::Id)
            .column(vehicles::Column::PlateNumber)
            .filter(vehicles::Column::CompanyId.eq(company_id))
            .filter(vehicles::Column::Id.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    /// Updates a tenant's vehicle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateVehicleInput,
    ) -> Result<vehicles::Model, RepositoryError> {
        let vehicle = self.find(company_id, id).await?;
        let mut active: vehicles::ActiveModel = vehicle.into();

        if let Some(plate_number) = input.plate_number {
            let plate_number = normalize_plate(&plate_number);
            self.ensure_plate_free(company_id, &plate_number, Some(id))
                .await?;
            active.plate_number = Set(plate_number);
        }
        if let Some(driver_id) = input.driver_id {
            if let Some(driver_id) = driver_id {
                self.ensure_driver(company_id, driver_id).await?;
            }
            active.driver_id = Set(driver_id);
        }
        if let Some(brand) = input.brand {
            active.brand = Set(normalize_optional(brand));
        }
        if let Some(model) = input.model {
            active.model = Set(normalize_optional(model));
        }
        if let Some(inspection_date) = input.inspection_date {
            active.inspection_date = Set(inspection_date);
        }
        if let Some(insurance_date) = input.insurance_date {
            active.insurance_date = Set(insurance_date);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, vehicle_id = %id, "vehicle updated");
        Ok(updated)
    }

    /// Deletes a tenant's vehicle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Conflict` while fuel records reference it.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        self.find(company_id, id).await?;
        let references = count_references::<fuels::Entity>(&self.db, fuels::Column::VehicleId, id).await?;
        if references > 0 {
            return Err(RepositoryError::Conflict(
                "Vehicle is still used by fuel records".to_string(),
            ));
        }

        let result = vehicles::Entity::delete_many()
            .filter(vehicles::Column::Id.eq(id))
            .filter(vehicles::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Vehicle"));
        }
        tracing::info!(company_id = %company_id, vehicle_id = %id, "vehicle deleted");
        Ok(())
    }

    async fn ensure_driver(&self, company_id: Uuid, driver_id: Uuid) -> Result<(), RepositoryError> {
        let count = employees::Entity::find_by_id(driver_id)
            .filter(employees::Column::CompanyId.eq(company_id))
            .count(&self.db)
            .await?;
        if count == 0 {
            return Err(RepositoryError::NotFound("Driver"));
        }
        Ok(())
    }

    async fn ensure_plate_free(
        &self,
        company_id: Uuid,
        plate_number: &str,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let mut query = vehicles::Entity::find()
            .filter(vehicles::Column::CompanyId.eq(company_id))
            .filter(vehicles::Column::PlateNumber.eq(plate_number));
        if let Some(id) = except {
            query = query.filter(vehicles::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Vehicle with plate '{plate_number}' already exists"
            )));
        }
        Ok(())
    }
}
