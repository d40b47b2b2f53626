//! Employee repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{
    check_employment_dates, ensure_amount, normalize_name, normalize_optional,
};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{apply_listing, count_references, paginate};
use crate::entities::{employees, vehicles};

/// Input for creating an employee.
#[derive(Debug, Clone)]
pub struct CreateEmployeeInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Full name, unique within the tenant.
    pub full_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Hire date.
    pub hire_date: Option<NaiveDate>,
    /// Termination date.
    pub termination_date: Option<NaiveDate>,
    /// Monthly salary.
    pub salary: Option<Decimal>,
    /// Whether the employee is currently employed.
    pub is_active: bool,
}

/// Input for updating an employee.
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeInput {
    /// New full name.
    pub full_name: Option<String>,
    /// New phone.
    pub phone: Option<Option<String>>,
    /// New department.
    pub department: Option<Option<String>>,
    /// New hire date.
    pub hire_date: Option<Option<NaiveDate>>,
    /// New termination date.
    pub termination_date: Option<Option<NaiveDate>>,
    /// New salary.
    pub salary: Option<Option<Decimal>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Employee-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Only active (or inactive) employees.
    pub is_active: Option<bool>,
}

/// Employee repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    db: DatabaseConnection,
}

impl EmployeeRepository {
    const SEARCH: [employees::Column; 3] = [
        employees::Column::FullName,
        employees::Column::Phone,
        employees::Column::Department,
    ];

    /// Creates a new employee repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an employee.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a termination before hire or a negative
    /// salary, and `Conflict` if the name is taken within the tenant.
    pub async fn create(
        &self,
        input: CreateEmployeeInput,
    ) -> Result<employees::Model, RepositoryError> {
        check_employment_dates(input.hire_date, input.termination_date)?;
        if let Some(salary) = input.salary {
            ensure_amount("salary", salary)?;
        }
        let full_name = normalize_name(&input.full_name);
        self.ensure_name_free(input.company_id, &full_name, None)
            .await?;

        let now = chrono::Utc::now().into();
        let employee = employees::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            full_name: Set(full_name),
            phone: Set(normalize_optional(input.phone)),
            department: Set(normalize_optional(input.department)),
            hire_date: Set(input.hire_date),
            termination_date: Set(input.termination_date),
            salary: Set(input.salary),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let employee = employee.insert(&self.db).await?;
        tracing::info!(
            company_id = %employee.company_id,
            employee_id = %employee.id,
            "employee created"
        );
        Ok(employee)
    }

    /// Lists a tenant's employees, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        employee_filter: &EmployeeFilter,
        page: &PageRequest,
    ) -> Result<PagedList<employees::Model>, RepositoryError> {
        let mut select =
            employees::Entity::find().filter(employees::Column::CompanyId.eq(company_id));
        if let Some(is_active) = employee_filter.is_active {
            select = select.filter(employees::Column::IsActive.eq(is_active));
        }
        let select = apply_listing(select, filter, &Self::SEARCH, None)
            .order_by_desc(employees::Column::CreatedAt)
            .order_by_desc(employees::Column::Id);

        Ok(paginate(&self.db, select, page).await?)
    }

    /// Finds a tenant's employee.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<employees::Model, RepositoryError> {
        employees::Entity::find_by_id(id)
            .filter(employees::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Employee"))
    }

    /// Fetches `(id, full_name)` for the given employees of a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn full_names(
        &self,
        company_id: Uuid,
        ids: Vec<Uuid>,
    ) -> Result<Vec<(Uuid, String)>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(employees::Entity::find()
            .select_only()
            .column(employees::Column::Id)
            .column(employees::Column::FullName)
            .filter(employees::Column::CompanyId.eq(company_id))
            .filter(employees::Column::Id.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    /// Updates a tenant's employee.
    ///
    /// The employment dates are checked after merging with stored values.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Validation` or `Conflict`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateEmployeeInput,
    ) -> Result<employees::Model, RepositoryError> {
        let employee = self.find(company_id, id).await?;

        let hire_date = input.hire_date.unwrap_or(employee.hire_date);
        let termination_date = input.termination_date.unwrap_or(employee.termination_date);
        check_employment_dates(hire_date, termination_date)?;
        if let Some(Some(salary)) = input.salary {
            ensure_amount("salary", salary)?;
        }

        let mut active: employees::ActiveModel = employee.into();
        if let Some(full_name) = input.full_name {
            let full_name = normalize_name(&full_name);
            self.ensure_name_free(company_id, &full_name, Some(id))
                .await?;
            active.full_name = Set(full_name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(normalize_optional(phone));
        }
        if let Some(department) = input.department {
            active.department = Set(normalize_optional(department));
        }
        if let Some(salary) = input.salary {
            active.salary = Set(salary);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.hire_date = Set(hire_date);
        active.termination_date = Set(termination_date);
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, employee_id = %id, "employee updated");
        Ok(updated)
    }

    /// Deletes a tenant's employee.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Conflict` while a vehicle names them as driver.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        self.find(company_id, id).await?;
        let references = count_references::<vehicles::Entity>(&self.db, vehicles::Column::DriverId, id).await?;
        if references > 0 {
            return Err(RepositoryError::Conflict(
                "Employee is still used by vehicles as their driver".to_string(),
            ));
        }

        let result = employees::Entity::delete_many()
            .filter(employees::Column::Id.eq(id))
            .filter(employees::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Employee"));
        }
        tracing::info!(company_id = %company_id, employee_id = %id, "employee deleted");
        Ok(())
    }

    async fn ensure_name_free(
        &self,
        company_id: Uuid,
        full_name: &str,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let mut query = employees::Entity::find()
            .filter(employees::Column::CompanyId.eq(company_id))
            .filter(employees::Column::FullName.eq(full_name));
        if let Some(id) = except {
            query = query.filter(employees::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Employee '{full_name}' already exists"
            )));
        }
        Ok(())
    }
}
