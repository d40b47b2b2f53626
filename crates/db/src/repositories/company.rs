//! Company (tenant) repository.

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
use crate::entities::{
    categories, companies, customers, employees, expenses, fuels, incomes, payments, vehicles,
};

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Company name (globally unique).
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Whether the company accepts requests.
    pub is_active: bool,
}

/// Input for updating a company.
#[derive(Debug, Clone, Default)]
pub struct UpdateCompanyInput {
    /// New name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Company repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    const SEARCH: [companies::Column; 2] =
        [companies::Column::Name, companies::Column::Description];

    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the name is taken.
    pub async fn create(
        &self,
        input: CreateCompanyInput,
    ) -> Result<companies::Model, RepositoryError> {
        let name = normalize_name(&input.name);
        self.ensure_name_free(&name, None).await?;

        let now = chrono::Utc::now().into();
        let company = companies::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(normalize_optional(input.description)),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let company = company.insert(&self.db).await?;
        tracing::info!(company_id = %company.id, name = %company.name, "company created");
        Ok(company)
    }

    /// Lists companies, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &ListFilter,
        page: &PageRequest,
    ) -> Result<PagedList<companies::Model>, RepositoryError> {
        let select = apply_listing(
            companies::Entity::find(),
            filter,
            &Self::SEARCH,
            None,
        )
        .order_by_desc(companies::Column::CreatedAt)
        .order_by_desc(companies::Column::Id);

        Ok(paginate(&self.db, select, page).await?)
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the company does not exist.
    pub async fn find(&self, id: Uuid) -> Result<companies::Model, RepositoryError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Company"))
    }

    /// Finds an active company, used to admit tenant requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active(&self, id: Uuid) -> Result<Option<companies::Model>, RepositoryError> {
        Ok(companies::Entity::find_by_id(id)
            .filter(companies::Column::IsActive.eq(true))
            .one(&self.db)
            .await?)
    }

    /// Updates a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict`.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCompanyInput,
    ) -> Result<companies::Model, RepositoryError> {
        let company = self.find(id).await?;
        let mut active: companies::ActiveModel = company.into();

        if let Some(name) = input.name {
            let name = normalize_name(&name);
            self.ensure_name_free(&name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %updated.id, "company updated");
        Ok(updated)
    }

    /// Deletes a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Conflict` while records still reference it.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.find(id).await?;
        let counts = tokio::try_join!(
            count_references::<categories::Entity>(&self.db, categories::Column::CompanyId, id),
            count_references::<customers::Entity>(&self.db, customers::Column::CompanyId, id),
            count_references::<employees::Entity>(&self.db, employees::Column::CompanyId, id),
            count_references::<vehicles::Entity>(&self.db, vehicles::Column::CompanyId, id),
            count_references::<expenses::Entity>(&self.db, expenses::Column::CompanyId, id),
            count_references::<incomes::Entity>(&self.db, incomes::Column::CompanyId, id),
            count_references::<fuels::Entity>(&self.db, fuels::Column::CompanyId, id),
            count_references::<payments::Entity>(&self.db, payments::Column::CompanyId, id),
        )?;
        let owned =
            counts.0 + counts.1 + counts.2 + counts.3 + counts.4 + counts.5 + counts.6 + counts.7;
        if owned > 0 {
            return Err(RepositoryError::Conflict(
                "Company still owns records".to_string(),
            ));
        }

        let result = companies::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Company"));
        }
        tracing::info!(company_id = %id, "company deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), RepositoryError> {
        let mut query = companies::Entity::find().filter(companies::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(companies::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Company '{name}' already exists"
            )));
        }
        Ok(())
    }
}
