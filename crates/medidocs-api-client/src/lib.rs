//! HTTP client for the file upload API.
//!
//! Provides a minimal client over the single upload endpoint, generic POST helpers, and
//! domain methods (list, retrieve, submit). The document fetcher, delivery resolver and
//! records view build on top of it; the CLI uses all of them directly.

pub mod api;
pub mod fetcher;
pub mod resolver;
pub mod view;

use bytes::Bytes;
use medidocs_core::{ClientConfig, DocumentError};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the file upload API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, DocumentError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DocumentError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    /// Create client from environment: MEDIDOCS_API_URL (or API_URL), MEDIDOCS_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self, DocumentError> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Base endpoint, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST JSON body and deserialize the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DocumentError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST json");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| DocumentError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocumentError::BackendRejected(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            DocumentError::MalformedResponse(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// POST JSON body and return the raw binary response body.
    ///
    /// Any transport error or non-success status becomes `RetrievalFailed` for `file_id`.
    pub async fn post_json_bytes<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        file_id: &str,
    ) -> Result<Bytes, DocumentError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, file_id, "POST for binary body");

        let failed = |status: Option<u16>, message: String| DocumentError::RetrievalFailed {
            file_id: file_id.to_string(),
            status,
            message,
        };

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/octet-stream, */*")
            .json(body)
            .send()
            .await
            .map_err(|e| failed(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(failed(Some(status.as_u16()), error_text));
        }

        response.bytes().await.map_err(|e| failed(None, e.to_string()))
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, DocumentError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST multipart");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DocumentError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocumentError::BackendRejected(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            DocumentError::MalformedResponse(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub use fetcher::{DocumentFetcher, RecordFetcher};
pub use resolver::DeliveryResolver;
pub use view::{Notification, RecordSource, RecordsView};
