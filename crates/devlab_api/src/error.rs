//! Translation of core failures into response envelopes.
//!
//! Status mapping: validation 400, unauthenticated 401, permission 403,
//! not found 404, conflict 409, storage 500.

use crate::response::ApiResponse;
use devlab_core::{RepoError, ServiceError, ValidationErrors, NON_FIELD_ERRORS};
use log::{error, info};
use serde_json::{json, Map, Value};

const DETAIL_KEY: &str = "detail";

/// HTTP status for one service error kind.
pub fn status_for(err: &ServiceError) -> u16 {
    match err {
        ServiceError::Validation(_) => 400,
        ServiceError::Unauthenticated => 401,
        ServiceError::Permission(_) => 403,
        ServiceError::NotFound { .. } => 404,
        ServiceError::Conflict(_) => 409,
        ServiceError::Repo(_) => 500,
    }
}

/// Renders `err` as a field-keyed error response.
pub fn error_response(err: &ServiceError) -> ApiResponse {
    let status = status_for(err);
    if status >= 500 {
        error!(
            "event=api_error module=api status=error code={} error={}",
            err.code(),
            err
        );
    } else {
        info!(
            "event=api_reject module=api status=error http_status={} code={}",
            status,
            err.code()
        );
    }

    let body = match err {
        ServiceError::Validation(errors) | ServiceError::Conflict(errors) => field_errors(errors),
        ServiceError::Repo(_) => json!({ DETAIL_KEY: ["internal storage error"] }),
        other => json!({ DETAIL_KEY: [other.to_string()] }),
    };
    ApiResponse::new(status, body)
}

/// `{"field": [messages]}` with non-field failures under `detail`.
fn field_errors(errors: &ValidationErrors) -> Value {
    let mut fields = Map::new();
    for (field, messages) in errors.fields() {
        let key = if field == NON_FIELD_ERRORS {
            DETAIL_KEY
        } else {
            field.as_str()
        };
        fields.insert(key.to_string(), json!(messages));
    }
    Value::Object(fields)
}

impl From<ServiceError> for ApiResponse {
    fn from(value: ServiceError) -> Self {
        error_response(&value)
    }
}

impl From<RepoError> for ApiResponse {
    fn from(value: RepoError) -> Self {
        error_response(&ServiceError::from(value))
    }
}
