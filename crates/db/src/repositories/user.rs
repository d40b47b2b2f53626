//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tally_core::listing::ListFilter;
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{apply_listing, paginate};
use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Argon2 PHC hash.
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
}

/// Input for updating a user.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New email.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    const SEARCH: [users::Column; 2] = [users::Column::Username, users::Column::Email];

    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username or email is taken.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, RepositoryError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        if self.username_exists(&username).await? {
            return Err(RepositoryError::Conflict(format!(
                "Username '{username}' is already taken"
            )));
        }
        self.ensure_email_free(&email, None).await?;

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            email: Set(email),
            password_hash: Set(input.password_hash),
            role: Set(input.role),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = user.insert(&self.db).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, RepositoryError> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn find(&self, id: Uuid) -> Result<users::Model, RepositoryError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("User"))
    }

    /// Lists users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &ListFilter,
        page: &PageRequest,
    ) -> Result<PagedList<users::Model>, RepositoryError> {
        let select = apply_listing(users::Entity::find(), filter, &Self::SEARCH, None)
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id);
        Ok(paginate(&self.db, select, page).await?)
    }

    /// Updates a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict`.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<users::Model, RepositoryError> {
        let user = self.find(id).await?;
        let mut active: users::ActiveModel = user.into();

        if let Some(email) = input.email {
            let email = email.trim().to_lowercase();
            self.ensure_email_free(&email, Some(id)).await?;
            active.email = Set(email);
        }
        if let Some(hash) = input.password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(user_id = %updated.id, "user updated");
        Ok(updated)
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("User"));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Returns true when any user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn any_exists(&self) -> Result<bool, RepositoryError> {
        Ok(users::Entity::find().count(&self.db).await? > 0)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> Result<(), RepositoryError> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Email '{email}' is already registered"
            )));
        }
        Ok(())
    }
}
