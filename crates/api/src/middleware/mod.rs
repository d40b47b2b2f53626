//! HTTP middleware.

pub mod auth;
pub mod error_log;
pub mod tenant;

pub use auth::{AdminUser, AuthUser, auth_middleware};
pub use error_log::error_log_middleware;
pub use tenant::{TENANT_HEADER, Tenant, tenant_middleware};
