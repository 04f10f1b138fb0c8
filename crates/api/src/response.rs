//! Uniform JSON response envelope.
//!
//! Every response body, success or failure, has the shape
//!
//! ```json
//! { "status": "OK", "message": "...", "timestamp": "...", "app_version": "...", "data": ... }
//! ```
//!
//! `status` is the canonical reason phrase of the HTTP status. `message` and
//! `data` are omitted when absent.

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub app_version: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Builds envelopes stamped with the running application version.
#[derive(Debug, Clone)]
pub struct Responder {
    app_version: Arc<str>,
}

impl Responder {
    #[must_use]
    pub fn new(app_version: impl Into<Arc<str>>) -> Self {
        Self {
            app_version: app_version.into(),
        }
    }

    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// 200 with a payload and no message.
    pub fn ok<T: Serialize>(&self, data: T) -> Response {
        self.respond(StatusCode::OK, None, Some(data))
    }

    /// 200 with a message and no payload.
    pub fn ok_message(&self, message: impl Into<String>) -> Response {
        self.respond::<()>(StatusCode::OK, Some(message.into()), None)
    }

    /// Error status with a message and no payload.
    pub fn error(&self, status: StatusCode, message: impl Into<String>) -> Response {
        self.respond::<()>(status, Some(message.into()), None)
    }

    pub fn respond<T: Serialize>(
        &self,
        status: StatusCode,
        message: Option<String>,
        data: Option<T>,
    ) -> Response {
        (status, Json(self.envelope(status, message, data))).into_response()
    }

    /// Build the envelope without turning it into a response.
    pub fn envelope<T>(
        &self,
        status: StatusCode,
        message: Option<String>,
        data: Option<T>,
    ) -> Envelope<T> {
        Envelope {
            status: status.canonical_reason().unwrap_or("Unknown"),
            message,
            timestamp: Utc::now(),
            app_version: Arc::clone(&self.app_version),
            data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_message() {
        let responder = Responder::new("1.2.3");
        let envelope = responder.envelope(StatusCode::OK, None, Some(vec![1, 2]));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["status"], "OK");
        assert_eq!(json["app_version"], "1.2.3");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let responder = Responder::new("1.2.3");
        let envelope =
            responder.envelope::<()>(StatusCode::BAD_REQUEST, Some("Invalid user ID".to_owned()), None);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["status"], "Bad Request");
        assert_eq!(json["message"], "Invalid user ID");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let responder = Responder::new("1.2.3");
        let json = serde_json::to_value(responder.envelope::<()>(StatusCode::OK, None, None)).unwrap();
        let raw = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(raw).is_ok());
    }

    #[test]
    fn test_status_codes_carry_through() {
        let responder = Responder::new("1.2.3");
        assert_eq!(
            responder.error(StatusCode::BAD_GATEWAY, "down").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(responder.ok_message("db connect ok").status(), StatusCode::OK);
    }
}
