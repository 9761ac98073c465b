//! Response envelope returned by every handler.

use serde::Serialize;
use serde_json::{json, Value};

/// HTTP-style status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(value: &impl Serialize) -> Self {
        Self::serialized(200, value)
    }

    pub fn created(value: &impl Serialize) -> Self {
        Self::serialized(201, value)
    }

    pub fn no_content() -> Self {
        Self::new(204, Value::Null)
    }

    /// Error body carrying one non-field message.
    pub fn detail(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "detail": [message.into()] }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn serialized(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::new(status, body),
            Err(err) => {
                log::error!(
                    "event=response_encode module=api status=error error={}",
                    err
                );
                Self::detail(500, "failed to encode response")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiResponse;
    use serde_json::json;

    #[test]
    fn detail_body_is_a_list() {
        let response = ApiResponse::detail(401, "not signed in");
        assert_eq!(response.status, 401);
        assert_eq!(response.body, json!({ "detail": ["not signed in"] }));
        assert!(!response.is_success());
    }

    #[test]
    fn no_content_has_null_body() {
        let response = ApiResponse::no_content();
        assert_eq!(response.status, 204);
        assert!(response.body.is_null());
        assert!(response.is_success());
    }
}
