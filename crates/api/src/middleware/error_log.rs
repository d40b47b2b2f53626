//! Persists every error response to `error_logs`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tally_db::{ErrorLogRepository, NewErrorLog};

use super::tenant::tenant_from_headers;
use crate::{AppState, error::ErrorReport};

/// Records failed requests after the response has been produced.
///
/// Responses built by [`crate::error::ApiError`] carry an [`ErrorReport`];
/// anything else (such as an unmatched route) is logged with its status
/// reason. Storage failures are traced and the original response is returned
/// unchanged.
pub async fn error_log_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let company_id = tenant_from_headers(request.headers());

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (message, stack, context) = match response.extensions().get::<ErrorReport>() {
        Some(report) => (
            report.message.clone(),
            Some(report.detail.clone()),
            Some(report.code.to_string()),
        ),
        None => (
            status.canonical_reason().unwrap_or("Error").to_string(),
            None,
            None,
        ),
    };

    let entry = NewErrorLog {
        company_id,
        status_code: status.as_u16(),
        message,
        stack,
        context,
        path,
        method,
    };
    if let Err(e) = ErrorLogRepository::new((*state.db).clone())
        .record(entry)
        .await
    {
        tracing::error!(error = %e, status = status.as_u16(), "failed to persist error log");
    }

    response
}
