//! HTTP routes for Parchment
//!
//! Every endpoint speaks the same JSON envelope as the original API:
//! `{"success": true, "message"?, "data"?}` on success,
//! `{"success": false, "message"}` on failure.

pub mod blueprints;
pub mod contracts;
pub mod health;

pub use blueprints::handle_blueprint_request;
pub use contracts::handle_contract_request;
pub use health::{api_index, health_check, version_info};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

type FullBody = Full<Bytes>;

/// `{"success": true, "message"?, "data"}` — message omitted when absent
pub(crate) fn data_response<T: Serialize>(
    status: StatusCode,
    message: Option<&str>,
    data: &T,
) -> Response<FullBody> {
    json_response(status, &data_envelope(message, data))
}

fn data_envelope<T: Serialize>(message: Option<&str>, data: &T) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Some(message) = message {
        body.insert("message".to_string(), Value::String(message.to_string()));
    }
    body.insert(
        "data".to_string(),
        serde_json::to_value(data).unwrap_or(Value::Null),
    );
    Value::Object(body)
}

/// `{"success": true, "message"}` — used for deletions
pub(crate) fn message_response(status: StatusCode, message: &str) -> Response<FullBody> {
    json_response(
        status,
        &serde_json::json!({ "success": true, "message": message }),
    )
}

/// `{"success": false, "message"}`
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response<FullBody> {
    json_response(
        status,
        &serde_json::json!({ "success": false, "message": message }),
    )
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope_omits_absent_message() {
        let body = data_envelope(None, &serde_json::json!([1, 2]));
        assert_eq!(body["success"], true);
        assert!(body.get("message").is_none());
        assert_eq!(body["data"], serde_json::json!([1, 2]));

        let body = data_envelope(Some("Contract created successfully"), &serde_json::json!({}));
        assert_eq!(body["message"], "Contract created successfully");
    }

    #[test]
    fn test_error_response_shape() {
        let resp = error_response(StatusCode::BAD_REQUEST, "Invalid ID format");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
