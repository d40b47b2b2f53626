//! Shared fixtures for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tally_api::{AppState, create_router, middleware::TENANT_HEADER};
use tally_core::reports::MonthLocale;
use tally_db::{
    CompanyRepository, CreateCompanyInput,
    migration::{Migrator, MigratorTrait},
};
use tally_shared::{JwtConfig, JwtService};
use tower::ServiceExt;
use uuid::Uuid;

/// Router wired to a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let jwt = Arc::new(JwtService::new(JwtConfig::default()));
        let state = AppState {
            db: Arc::new(db.clone()),
            jwt_service: jwt.clone(),
            report_locale: MonthLocale::En,
        };
        Self {
            router: create_router(state),
            db,
            jwt,
        }
    }

    /// Bearer token for a user that only exists in the token.
    pub fn token(&self, role: &str) -> String {
        self.jwt
            .generate_access_token(Uuid::new_v4(), "tester", role)
            .expect("Failed to sign token")
    }

    pub async fn company(&self, name: &str) -> Uuid {
        CompanyRepository::new(self.db.clone())
            .create(CreateCompanyInput {
                name: name.to_string(),
                description: None,
                is_active: true,
            })
            .await
            .expect("Failed to create company")
            .id
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed")
    }
}

/// Request builder with optional token, tenant and JSON body.
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    company: Option<Uuid>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(company) = company {
        builder = builder.header(TENANT_HEADER, company.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}
