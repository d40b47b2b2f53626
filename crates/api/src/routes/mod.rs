//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState, openapi,
    middleware::{auth_middleware, tenant_middleware},
};

pub mod auth;
pub mod categories;
pub mod companies;
pub mod customers;
pub mod employees;
pub mod expenses;
pub mod fuels;
pub mod health;
pub mod incomes;
pub mod payments;
pub mod reports;
pub mod users;
pub mod vehicles;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Authenticated, not tied to a company
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(companies::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Authenticated and scoped by `x-company-id`; the auth layer is outermost
    let tenant_routes = Router::new()
        .merge(categories::routes())
        .merge(customers::routes())
        .merge(employees::routes())
        .merge(vehicles::routes())
        .merge(expenses::routes())
        .merge(incomes::routes())
        .merge(fuels::routes())
        .merge(payments::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(openapi::routes())
        .merge(auth::routes())
        .merge(protected_routes)
        .merge(tenant_routes)
}
