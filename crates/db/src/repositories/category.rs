//! Category repository.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tally_core::listing::ListFilter;
use tally_core::records::{self, normalize_name, normalize_optional};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{apply_listing, count_references, paginate};
use crate::entities::{categories, expenses, incomes, sea_orm_active_enums::CategoryType};

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Owning tenant.
    pub company_id: Uuid,
    /// Name, unique within the tenant.
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Income or expense.
    pub category_type: CategoryType,
}

/// Input for updating a category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New kind.
    pub category_type: Option<CategoryType>,
}

/// Category-specific list filters.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Only categories of this kind.
    pub category_type: Option<CategoryType>,
}

/// Category repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    const SEARCH: [categories::Column; 2] =
        [categories::Column::Name, categories::Column::Description];

    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the name is taken within the tenant.
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<categories::Model, RepositoryError> {
        let name = normalize_name(&input.name);
        self.ensure_name_free(input.company_id, &name, None).await?;

        let now = chrono::Utc::now().into();
        let category = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            name: Set(name),
            description: Set(normalize_optional(input.description)),
            category_type: Set(input.category_type),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = category.insert(&self.db).await?;
        tracing::info!(
            company_id = %category.company_id,
            category_id = %category.id,
            "category created"
        );
        Ok(category)
    }

    /// Lists a tenant's categories, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: &ListFilter,
        category_filter: &CategoryFilter,
        page: &PageRequest,
    ) -> Result<PagedList<categories::Model>, RepositoryError> {
        let mut select = categories::Entity::find()
            .filter(categories::Column::CompanyId.eq(company_id));
        if let Some(kind) = category_filter.category_type {
            select = select.filter(categories::Column::CategoryType.eq(kind));
        }
        let select = apply_listing(select, filter, &Self::SEARCH, None)
            .order_by_desc(categories::Column::CreatedAt)
            .order_by_desc(categories::Column::Id);

        Ok(paginate(&self.db, select, page).await?)
    }

    /// Finds a tenant's category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist in the tenant.
    pub async fn find(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<categories::Model, RepositoryError> {
        categories::Entity::find_by_id(id)
            .filter(categories::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Category"))
    }

    /// Fails unless the category exists in the tenant and is of `expected` kind.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn ensure_kind(
        &self,
        company_id: Uuid,
        id: Uuid,
        expected: records::CategoryType,
    ) -> Result<(), RepositoryError> {
        let category = self.find(company_id, id).await?;
        records::CategoryType::from(category.category_type).ensure(expected)?;
        Ok(())
    }

    /// Maps category ids to names within a tenant.
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
        let rows = categories::Entity::find()
            .filter(categories::Column::CompanyId.eq(company_id))
            .filter(categories::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|c| (c.id, c.name)).collect())
    }

    /// Updates a tenant's category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Conflict` for a taken name or a type change
    /// while records use the category.
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<categories::Model, RepositoryError> {
        let category = self.find(company_id, id).await?;
        let current_type = category.category_type;
        let mut active: categories::ActiveModel = category.into();

        if let Some(name) = input.name {
            let name = normalize_name(&name);
            self.ensure_name_free(company_id, &name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(normalize_optional(description));
        }
        if let Some(kind) = input.category_type
            && kind != current_type
        {
            if self.reference_count(id).await? > 0 {
                return Err(RepositoryError::Conflict(
                    "Category type cannot change while records use it".to_string(),
                ));
            }
            active.category_type = Set(kind);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(company_id = %company_id, category_id = %id, "category updated");
        Ok(updated)
    }

    /// Incomes and expenses filed under the category.
    async fn reference_count(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let income_refs =
            count_references::<incomes::Entity>(&self.db, incomes::Column::CategoryId, id).await?;
        let expense_refs =
            count_references::<expenses::Entity>(&self.db, expenses::Column::CategoryId, id)
                .await?;
        Ok(income_refs + expense_refs)
    }

    /// Deletes a tenant's category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Conflict` while records still reference it.
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        self.find(company_id, id).await?;
        if self.reference_count(id).await? > 0 {
            return Err(RepositoryError::Conflict(
                "Category is still used by incomes or expenses".to_string(),
            ));
        }

        let result = categories::Entity::delete_many()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Category"));
        }
        tracing::info!(company_id = %company_id, category_id = %id, "category deleted");
        Ok(())
    }

    async fn ensure_name_free(
        &self,
        company_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::CompanyId.eq(company_id))
            .filter(categories::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Category '{name}' already exists"
            )));
        }
        Ok(())
    }
}
