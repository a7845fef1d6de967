//! Shared request/response types used by API-facing crates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Body of the presence endpoint. `lastSeen` is whatever clock string the
/// client reports; the server does not reinterpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdateRequest {
    pub status: Option<String>,
    #[serde(rename = "lastSeen")]
    pub last_seen: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_ok_payload() {
        let response = HealthCheckResponse::ok();
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn error_response_round_trip_json() {
        let response = ErrorResponse {
            code: "not_found".to_string(),
            message: "resource missing".to_string(),
        };

        let json = serde_json::to_string(&response).expect("serialize error response");
        let decoded: ErrorResponse =
            serde_json::from_str(&json).expect("deserialize error response");

        assert_eq!(decoded, response);
    }

    #[test]
    fn presence_update_uses_camel_case_field() {
        let body: PresenceUpdateRequest =
            serde_json::from_str(r#"{"status":"online","lastSeen":"2026-05-04T10:00:00Z"}"#)
                .expect("deserialize presence update");

        assert_eq!(body.status.as_deref(), Some("online"));
        assert_eq!(body.last_seen.as_deref(), Some("2026-05-04T10:00:00Z"));
    }
}
