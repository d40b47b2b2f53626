//! HTTP error translation.
//!
//! Every handler returns `Result<_, ApiError>`; this is the only place where
//! an error becomes a status code and a JSON envelope.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tally_core::auth::PasswordError;
use tally_core::export::ExportError;
use tally_core::listing::ListingError;
use tally_core::relation::RelationError;
use tally_db::RepositoryError;
use tally_shared::{AppError, FieldError, JwtError};
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Error envelope returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// HTTP status code.
    pub status_code: u16,
    /// Client-safe message.
    pub message: String,
    /// Per-field validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub errors: Option<Vec<FieldError>>,
}

/// What the error-log middleware needs to know about a failed response.
///
/// Attached to the response extensions by [`ApiError::into_response`].
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Message sent to the client.
    pub message: String,
    /// Full internal error text.
    pub detail: String,
    /// Machine-readable code.
    pub code: &'static str,
}

/// Handler error wrapping [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// 400 with a plain message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// 401 with a plain message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }

    /// 403 with a plain message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self(AppError::Forbidden(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_server_error() {
            tracing::error!(error = %err, code = err.error_code(), "request failed");
        } else {
            tracing::debug!(error = %err, code = err.error_code(), "request rejected");
        }

        let body = ErrorBody {
            success: false,
            status_code: status.as_u16(),
            message: err.public_message(),
            errors: err.field_errors().map(<[FieldError]>::to_vec),
        };
        let report = ErrorReport {
            message: body.message.clone(),
            detail: err.to_string(),
            code: err.error_code(),
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self(err.into())
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        Self(err.into())
    }
}

impl From<RelationError> for ApiError {
    fn from(err: RelationError) -> Self {
        Self(err.into())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self(err.into())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self(err.into())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_errors(None, &errors, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self(AppError::InvalidFields(fields))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

fn collect_field_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{}", camel_case(field)),
            None => camel_case(field),
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let message = failure.message.as_ref().map_or_else(
                        || format!("{name} is invalid ({})", failure.code),
                        ToString::to_string,
                    );
                    out.push(FieldError::new(name.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(Some(&name), nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(Some(&format!("{name}[{index}]")), nested, out);
                }
            }
        }
    }
}

/// `plate_number` → `plateNumber`, matching the wire names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "plate number is required"))]
        plate_number: String,
        #[validate(range(min = 1))]
        unit_count: u32,
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("plate_number"), "plateNumber");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn test_validation_errors_become_field_errors() {
        let sample = Sample {
            plate_number: String::new(),
            unit_count: 0,
        };
        let err = ApiError::from(sample.validate().unwrap_err());
        let fields = err.0.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "plateNumber");
        assert_eq!(fields[0].message, "plate number is required");
        assert_eq!(fields[1].field, "unitCount");
        assert_eq!(err.0.status_code(), 400);
    }

    #[test]
    fn test_server_error_hides_detail() {
        let response = ApiError(AppError::Database("connection reset".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.message, "An unexpected error occurred");
        assert!(report.detail.contains("connection reset"));
        assert_eq!(report.code, "DATABASE_ERROR");
    }
}
