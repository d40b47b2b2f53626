//! Tenant resolution from the `x-company-id` header.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tally_db::CompanyRepository;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Header naming the company a request acts on.
pub const TENANT_HEADER: &str = "x-company-id";

/// Parses the tenant header, if present and a valid UUID.
pub fn tenant_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// Admits a request only for an existing, active company.
///
/// The resolved id is stored in request extensions for [`Tenant`].
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let raw = request.headers().get(TENANT_HEADER);
    if raw.is_none() {
        return ApiError::bad_request(format!("The {TENANT_HEADER} header is required"))
            .into_response();
    }
    let Some(company_id) = tenant_from_headers(request.headers()) else {
        return ApiError::bad_request(format!("The {TENANT_HEADER} header must be a UUID"))
            .into_response();
    };

    match CompanyRepository::new((*state.db).clone())
        .find_active(company_id)
        .await
    {
        Ok(Some(_)) => {
            request.extensions_mut().insert(Tenant(company_id));
            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!(company_id = %company_id, "unknown or inactive company");
            ApiError::forbidden("Company not found or inactive").into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// The company the current request is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenant(pub Uuid);

impl Tenant {
    /// Company id.
    #[must_use]
    pub const fn id(self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| ApiError::bad_request(format!("The {TENANT_HEADER} header is required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_tenant_from_headers() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert_eq!(tenant_from_headers(&headers), None);

        headers.insert(TENANT_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(tenant_from_headers(&headers), None);

        headers.insert(
            TENANT_HEADER,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );
        assert_eq!(tenant_from_headers(&headers), Some(id));
    }
}
