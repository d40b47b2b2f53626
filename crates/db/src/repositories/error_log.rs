//! Persistence of failed requests.

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::error_logs;

/// One failed request, as captured by the HTTP layer.
#[derive(Debug, Clone)]
pub struct NewErrorLog {
    /// Tenant from the request header, when it was a valid id.
    pub company_id: Option<Uuid>,
    /// Response status.
    pub status_code: u16,
    /// Message sent to the client.
    pub message: String,
    /// Internal detail that was not sent to the client.
    pub stack: Option<String>,
    /// Machine-readable error code.
    pub context: Option<String>,
    /// Request path.
    pub path: String,
    /// Request method.
    pub method: String,
}

/// Append-only error log repository.
#[derive(Debug, Clone)]
pub struct ErrorLogRepository {
    db: DatabaseConnection,
}

impl ErrorLogRepository {
    /// Creates a new error log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record(&self, entry: NewErrorLog) -> Result<error_logs::Model, RepositoryError> {
        let log = error_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(entry.company_id),
            status_code: Set(i32::from(entry.status_code)),
            message: Set(entry.message),
            stack: Set(entry.stack),
            context: Set(entry.context),
            path: Set(entry.path),
            method: Set(entry.method),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(log.insert(&self.db).await?)
    }
}
