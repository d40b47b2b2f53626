//! Customer repository.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{normalize_name, normalize_optional};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{apply_listing, count_references, paginate};
use crate::entities::{customers, incomes, payments};

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Name, unique within the tenant.
    pub name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Free text.
    pub description: Option<String>,
}

/// Input for updating a customer.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// New name.
    pub name: Option<String>,
    /// New phone; `Some(None)` clears it.
    pub phone: Option<Option<String>>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    const SEARCH: [customers::Column; 3] = [
        customers::Column::Name,
        customers::Column::Phone,
        customers::Column::Description,
    ];

    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the name is taken within the tenant.
    pub async fn create(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, RepositoryError> {
        let name = normalize_name(&input.name);
        self.ensure_name_free(input.company_id, &name, None).await?;

        let now = chrono::Utc::now().into();
        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            name: Set(name),
            phone: Set(normalize_optional(input.phone)),
            description: Set(normalize_optional(input.description)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let customer = customer.insert(&self.db).await?;
        tracing::info!(
            company_id = %customer.company_id,
            customer_id = %customer.id,
            "customer created"
        );
        Ok(customer)
    }

    /// Lists a tenant's customers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        page: &PageRequest,
    ) -> Result<PagedList<customers::Model>, RepositoryError> {
        let select = customers::Entity::find().filter(customers::Column::CompanyId.eq(company_id));
        let select = apply_listing(select, filter, &Self::SEARCH, None)
            .order_by_desc(customers::Column::CreatedAt)
            .order_by_desc(customers::Column::Id);

        Ok(paginate(&self.db, select, page).await?)
    }

    /// Finds a tenant's customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<customers::Model, RepositoryError> {
        customers::Entity::find_by_id(id)
            .filter(customers::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Customer"))
    }

    /// Maps customer ids to names within a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn names(
        &self,
        company_id: Uuid,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = customers::Entity::find()
            .filter(customers::Column::CompanyId.eq(company_id))
            .filter(customers::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|c| (c.id, c.name)).collect())
    }

    /// Updates a tenant's customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict`.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customers::Model, RepositoryError> {
        let customer = self.find(company_id, id).await?;
        let mut active: customers::ActiveModel = customer.into();

        if let Some(name) = input.name {
            let name = normalize_name(&name);
            self.ensure_name_free(company_id, &name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(normalize_optional(phone));
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, customer_id = %id, "customer updated");
        Ok(updated)
    }

    /// Deletes a tenant's customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Conflict` while incomes or payments reference it.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        self.find(company_id, id).await?;
        let references =
            count_references::<incomes::Entity>(&self.db, incomes::Column::CustomerId, id).await?
                + count_references::<payments::Entity>(&self.db, payments::Column::CustomerId, id).await?;
        if references > 0 {
            return Err(RepositoryError::Conflict(
                "Customer is still used by incomes or payments".to_string(),
            ));
        }

        let result = customers::Entity::delete_many()
            .filter(customers::Column::Id.eq(id))
            .filter(customers::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Customer"));
        }
        tracing::info!(company_id = %company_id, customer_id = %id, "customer deleted");
        Ok(())
    }

    async fn ensure_name_free(
        &self,
        company_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let mut query = customers::Entity::find()
            .filter(customers::Column::CompanyId.eq(company_id))
            .filter(customers::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(customers::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Customer '{name}' already exists"
            )));
        }
        Ok(())
    }
}
