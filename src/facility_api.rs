// Client for the ATAL facility-management REST API

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ConnectorConfig;
use crate::error::{GatewayError, GatewayResult};

pub const API_KEY_HEADER: &str = "X-API-Key";

pub type Query<'a> = &'a [(&'a str, String)];

// Narrow request/response contract the core talks to
#[async_trait]
pub trait FacilityApi: Send + Sync + 'static {
    // GET returning parsed JSON, fails on non-2xx
    async fn get(&self, path: &str, query: Query<'_>) -> GatewayResult<Value>;

    // POST a JSON body, fails on non-2xx
    async fn post(&self, path: &str, body: &Value) -> GatewayResult<Value>;

    // Plain-text GET used to probe connectivity; any status is returned
    async fn get_text(&self, path: &str) -> GatewayResult<(u16, String)>;
}

/// Decodes a JSON payload returned by ATAL into the expected shape.
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> GatewayResult<T> {
    serde_json::from_value(value).map_err(|e| {
        GatewayError::remote(
            None,
            format!("unexpected response shape from {}: {}", path, e),
            None,
        )
    })
}

pub struct AtalClient {
    config: ConnectorConfig,
    http: reqwest::Client,
}

impl AtalClient {
    pub fn new(config: ConnectorConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Configuration(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> GatewayResult<Value> {
        let response = request
            .header(API_KEY_HEADER, self.config.api_key()?)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body: Bytes = response.bytes().await?;
        debug!(path, status = status.as_u16(), bytes = body.len(), "ATAL response");

        if !status.is_success() {
            return Err(remote_status_error(status, &body));
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| {
            GatewayError::remote(
                Some(status.as_u16()),
                format!("malformed JSON from {}: {}", path, e),
                Some(String::from_utf8_lossy(&body).into_owned()),
            )
        })
    }
}

fn remote_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let text = String::from_utf8_lossy(body).into_owned();
    GatewayError::remote(
        Some(status.as_u16()),
        format!(
            "{} (HTTP error {})",
            status.canonical_reason().unwrap_or("unexpected status"),
            status.as_u16()
        ),
        (!text.is_empty()).then_some(text),
    )
}

#[async_trait]
impl FacilityApi for AtalClient {
    async fn get(&self, path: &str, query: Query<'_>) -> GatewayResult<Value> {
        let url = self.config.endpoint(path)?;
        self.send(path, self.http.get(url).query(query)).await
    }

    async fn post(&self, path: &str, body: &Value) -> GatewayResult<Value> {
        let url = self.config.endpoint(path)?;
        self.send(path, self.http.post(url).json(body)).await
    }

    async fn get_text(&self, path: &str) -> GatewayResult<(u16, String)> {
        let url = self.config.endpoint(path)?;
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.config.api_key()?)
            .header(ACCEPT, "text/plain")
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}
