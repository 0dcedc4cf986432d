//! REST transport over `reqwest`.

use crate::config::ClientConfig;
use async_trait::async_trait;
use opsboard_sync::{Transport, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// HTTP implementation of the sync layer's [`Transport`] seam.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header: build_auth_headers(config),
        })
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<Value>()
                .await
                .map_err(|err| TransportError::Decode(err.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::from_status(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn get_json(&self, endpoint: &str) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(url)
            .headers(self.auth_header.clone())
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Self::parse_response(response).await
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Self::parse_response(response).await
    }
}

fn build_auth_headers(config: &ClientConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &config.auth.api_key {
        if let Ok(value) = HeaderValue::from_str(api_key) {
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }
    }
    if let Some(token) = &config.auth.bearer_token {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(HeaderName::from_static("authorization"), value);
        }
    }
    headers
}
