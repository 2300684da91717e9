//! Document fetching.

use async_trait::async_trait;
use bytes::Bytes;
use medidocs_core::models::AggregatedRecord;
use medidocs_core::DocumentError;

use crate::ApiClient;

/// Retrieves a file's binary payload by its storage handle.
///
/// Implementations make a single attempt and surface every failure as
/// `DocumentError::RetrievalFailed`; they never retry and hold no shared state.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Bytes, DocumentError>;
}

#[async_trait]
impl DocumentFetcher for ApiClient {
    async fn fetch(&self, file_id: &str) -> Result<Bytes, DocumentError> {
        self.fetch_preview(file_id).await
    }
}

#[async_trait]
impl<T: DocumentFetcher + ?Sized> DocumentFetcher for &T {
    async fn fetch(&self, file_id: &str) -> Result<Bytes, DocumentError> {
        (**self).fetch(file_id).await
    }
}

/// Fetcher bound to one admission, using the download-single route.
#[derive(Debug, Clone)]
pub struct RecordFetcher<'a> {
    client: &'a ApiClient,
    patient_id: String,
    admission_id: String,
}

impl<'a> RecordFetcher<'a> {
    pub fn new(client: &'a ApiClient, patient_id: &str, admission_id: &str) -> Self {
        Self {
            client,
            patient_id: patient_id.to_string(),
            admission_id: admission_id.to_string(),
        }
    }

    pub fn for_record(client: &'a ApiClient, record: &AggregatedRecord) -> Self {
        Self::new(client, &record.patient_id, &record.admission_id)
    }
}

#[async_trait]
impl DocumentFetcher for RecordFetcher<'_> {
    async fn fetch(&self, file_id: &str) -> Result<Bytes, DocumentError> {
        self.client
            .download_single(file_id, &self.patient_id, &self.admission_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medidocs_core::ClientConfig;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_client_fetch_uses_preview_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/files/preview")
            .match_body(Matcher::Json(json!({"drive_file_id": "a"})))
            .with_status(200)
            .with_body("bytes")
            .create_async()
            .await;
        let client = ApiClient::new(&ClientConfig::with_api_url(&format!("{}/files", server.url()))).unwrap();

        let fetcher: &dyn DocumentFetcher = &client;
        let data = fetcher.fetch("a").await.unwrap();

        mock.assert_async().await;
        assert_eq!(data.as_ref(), b"bytes");
    }

    #[tokio::test]
    async fn test_record_fetcher_uses_download_single_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/files/")
            .match_body(Matcher::PartialJson(json!({
                "action_mode": "download-single",
                "patient_id": "7",
                "admission_id": "9"
            })))
            .with_status(200)
            .with_body("doc")
            .create_async()
            .await;
        let client = ApiClient::new(&ClientConfig::with_api_url(&format!("{}/files", server.url()))).unwrap();

        let data = RecordFetcher::new(&client, "7", "9").fetch("f1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(data.as_ref(), b"doc");
    }
}
