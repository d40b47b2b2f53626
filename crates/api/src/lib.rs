//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication and tenant middleware
//! - Request extractors and the response envelope
//! - XLSX export responses and the OpenAPI document

pub mod error;
pub mod export;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod query;
pub mod response;
pub mod routes;

use axum::{Router, middleware::from_fn_with_state};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_core::reports::MonthLocale;
use tally_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::error_log_middleware;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Month names used by the monthly report.
    pub report_locale: MonthLocale,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(from_fn_with_state(state.clone(), error_log_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
