// src/error.rs
use reqwest::header::InvalidHeaderValue;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NearbyError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Supabase API error (code {code}): {message}")]
    ApiError { code: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Duplicate value: {0}")]
    DuplicateValue(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Geocoding failed: {0}")]
    GeocodingFailed(String),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(InvalidHeaderValue),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl NearbyError {
    /// Creates a `NearbyError` from an HTTP status code and a PostgREST JSON error body.
    ///
    /// PostgREST reports failures as `{"code": "...", "message": "...", "details": ..., "hint": ...}`.
    /// Codes starting with `PGRST` come from PostgREST itself, five-character codes are Postgres SQLSTATEs.
    pub(crate) fn from_response(status_code: u16, response_body: Value) -> Self {
        let error_code = response_body
            .get("code")
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_default();
        let error_message = response_body
            .get("message")
            .or_else(|| response_body.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();

        match error_code.as_str() {
            // Single-row request matched zero rows
            "PGRST116" => NearbyError::NotFound(format!("({}) {}", error_code, error_message)),
            // Unknown column / relation in the request
            "PGRST100" | "PGRST200" | "42703" | "42P01" => {
                NearbyError::InvalidQuery(format!("({}) {}", error_code, error_message))
            }
            "PGRST301" | "PGRST302" | "42501" => NearbyError::AuthenticationError(format!(
                "({}) {}",
                error_code, error_message
            )),
            "23505" => NearbyError::DuplicateValue(format!("({}) {}", error_code, error_message)),
            _ => {
                if status_code >= 500 {
                    NearbyError::InternalServerError(format!(
                        "Server error (HTTP {}): ({}) {}",
                        status_code, error_code, error_message
                    ))
                } else if status_code == 401 || status_code == 403 {
                    NearbyError::AuthenticationError(format!(
                        "Auth error (HTTP {}): ({}) {}",
                        status_code, error_code, error_message
                    ))
                } else if status_code == 404 {
                    NearbyError::NotFound(format!(
                        "Not found (HTTP {}): ({}) {}",
                        status_code, error_code, error_message
                    ))
                } else {
                    NearbyError::ApiError {
                        code: error_code,
                        message: error_message,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_postgrest_codes() {
        let err = NearbyError::from_response(
            406,
            json!({"code": "PGRST116", "message": "JSON object requested, multiple (or no) rows returned"}),
        );
        assert!(matches!(err, NearbyError::NotFound(_)));

        let err = NearbyError::from_response(
            400,
            json!({"code": "42703", "message": "column events.lat does not exist"}),
        );
        assert!(matches!(err, NearbyError::InvalidQuery(msg) if msg.contains("events.lat")));

        let err = NearbyError::from_response(409, json!({"code": "23505", "message": "dup"}));
        assert!(matches!(err, NearbyError::DuplicateValue(_)));
    }

    #[test]
    fn falls_back_to_http_status() {
        let err = NearbyError::from_response(401, json!({"message": "Invalid API key"}));
        assert!(matches!(err, NearbyError::AuthenticationError(_)));

        let err = NearbyError::from_response(503, json!({"code": 503, "error": "unavailable"}));
        assert!(matches!(err, NearbyError::InternalServerError(msg) if msg.contains("unavailable")));

        let err = NearbyError::from_response(400, json!({"code": "22P02", "message": "bad uuid"}));
        match err {
            NearbyError::ApiError { code, message } => {
                assert_eq!(code, "22P02");
                assert_eq!(message, "bad uuid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
