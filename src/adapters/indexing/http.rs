//! Shared HTTP plumbing for the indexing clients

use crate::config::IndexingConfig;
use crate::core::sync::operation::{BatchRequest, Operation};
use crate::domain::{IndexingError, Result, SyncError};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the application id
pub const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-algolia-api-key";

/// Configured reqwest client plus base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from the indexing configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the credentials are not valid
    /// header values or the client cannot be built.
    pub fn new(config: &IndexingConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(ref app_id) = config.application_id {
            let value = HeaderValue::from_str(app_id).map_err(|e| {
                SyncError::Configuration(format!("Invalid indexing.application_id: {e}"))
            })?;
            headers.insert(APPLICATION_ID_HEADER, value);
        }

        if let Some(ref api_key) = config.api_key {
            let mut value = HeaderValue::from_str(api_key.expose_secret().as_ref()).map_err(|_| {
                SyncError::Configuration("Invalid indexing.api_key".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    /// Base URL, always ending in `/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `{"requests": operations}` to `{base_url}{path}` and return the JSON reply
    ///
    /// # Errors
    ///
    /// Maps timeouts, connection failures, non-success statuses and
    /// unparseable bodies onto [`IndexingError`].
    pub async fn post_batch(
        &self,
        path: &str,
        operations: &[Operation],
    ) -> std::result::Result<Value, IndexingError> {
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&BatchRequest {
                requests: operations,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IndexingError::Timeout(e.to_string())
                } else {
                    IndexingError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexingError::from_status(status.as_u16(), body));
        }

        // The batch is accepted once the status is 2xx; the body only
        // carries optional references
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not read batch response body");
                return Ok(Value::Null);
            }
        };
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str(&text) {
            Ok(body) => Ok(body),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Batch response body is not JSON");
                Ok(Value::Null)
            }
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

/// Reads a reference field that the service may send as string or number
pub(crate) fn reference_field(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
