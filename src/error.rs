// Error kinds surfaced by the gateway to the front office

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("ATAL error: {message}")]
    RemoteService {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Our own payload could not be encoded
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn remote(status: Option<u16>, message: impl Into<String>, body: Option<String>) -> Self {
        GatewayError::RemoteService {
            status,
            message: message.into(),
            body,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    pub fn encoding(what: &str, error: serde_json::Error) -> Self {
        GatewayError::Internal(format!("cannot encode {}: {}", what, error))
    }

    // Class name reported in the error envelope
    pub fn class(&self) -> &'static str {
        match self {
            GatewayError::RemoteService { .. } => "RemoteServiceError",
            GatewayError::Validation(_) => "ValidationError",
            GatewayError::Configuration(_) => "ConfigurationError",
            GatewayError::Internal(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RemoteService { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Configuration(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::RemoteService {
            status: error.status().map(|status| status.as_u16()),
            message: error.to_string(),
            body: None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let data = match &self {
            e @ GatewayError::RemoteService { status, body, .. } => {
                tracing::error!(error.message = %e, status = ?status, "ATAL call failed");
                json!({ "status": status, "body": body })
            }
            GatewayError::Validation(_) => serde_json::Value::Null,
            e @ GatewayError::Configuration(_) => {
                tracing::error!(error.message = %e, "Connector is misconfigured");
                serde_json::Value::Null
            }
            e @ GatewayError::Internal(_) => {
                tracing::error!(error.message = %e, "Response encoding failed");
                serde_json::Value::Null
            }
        };

        let payload = json!({
            "err": 1,
            "err_class": self.class(),
            "err_desc": self.to_string(),
            "data": data,
        });
        (status_code, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(GatewayError::remote(Some(500), "boom", None), StatusCode::BAD_GATEWAY, "RemoteServiceError")]
    #[test_case(GatewayError::validation("missing room"), StatusCode::BAD_REQUEST, "ValidationError")]
    #[test_case(GatewayError::Configuration("no key".into()), StatusCode::INTERNAL_SERVER_ERROR, "ConfigurationError")]
    #[test_case(GatewayError::Internal("bad map key".into()), StatusCode::INTERNAL_SERVER_ERROR, "InternalError")]
    fn test_error_kinds_map_to_status(error: GatewayError, status: StatusCode, class: &str) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.class(), class);
    }

    #[tokio::test]
    async fn test_remote_error_payload_carries_status_and_body() {
        let error = GatewayError::remote(
            Some(404),
            "Not Found",
            Some("{\"Message\":\"unknown room\"}".to_string()),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["err"], 1);
        assert_eq!(payload["err_class"], "RemoteServiceError");
        assert_eq!(payload["err_desc"], "ATAL error: Not Found");
        assert_eq!(payload["data"]["status"], 404);
        assert_eq!(payload["data"]["body"], "{\"Message\":\"unknown room\"}");
    }
}
