//! Domain methods for the file upload API.
//!
//! Every operation goes through the same endpoint; the JSON `action_mode` (or the
//! `preview` sub-path) selects what the backend does.

use bytes::Bytes;
use medidocs_core::models::{
    parse_list_response, AggregatedRecord, FileDescriptor, FileUploadRow, RecordSubmission,
    SubmitResponse,
};
use medidocs_core::{aggregate, DocumentError, ResolvedDelivery};
use serde::Serialize;

use crate::ApiClient;

#[derive(Debug, Serialize)]
struct ListRequest {
    action_mode: &'static str,
}

#[derive(Debug, Serialize)]
struct PreviewRequest<'a> {
    drive_file_id: &'a str,
}

#[derive(Debug, Serialize)]
struct DownloadSingleRequest<'a> {
    action_mode: &'static str,
    file_id: &'a str,
    patient_id: &'a str,
    admission_id: &'a str,
}

impl ApiClient {
    /// List every stored file row, normalizing the response shape.
    pub async fn list_rows(&self) -> Result<Vec<FileUploadRow>, DocumentError> {
        let body: serde_json::Value = self
            .post_json("", &ListRequest {
                action_mode: "getlist",
            })
            .await?;
        parse_list_response(body)
    }

    /// List rows and group them into per-admission records.
    pub async fn list_records(&self) -> Result<Vec<AggregatedRecord>, DocumentError> {
        let rows = self.list_rows().await?;
        Ok(aggregate(&rows))
    }

    /// Retrieve a file's bytes through the preview route. Single attempt, no retry.
    pub async fn fetch_preview(&self, file_id: &str) -> Result<Bytes, DocumentError> {
        self.post_json_bytes(
            "preview",
            &PreviewRequest {
                drive_file_id: file_id,
            },
            file_id,
        )
        .await
    }

    /// Retrieve a file's bytes with the owning admission as routing context.
    pub async fn download_single(
        &self,
        file_id: &str,
        patient_id: &str,
        admission_id: &str,
    ) -> Result<Bytes, DocumentError> {
        self.post_json_bytes(
            "",
            &DownloadSingleRequest {
                action_mode: "download-single",
                file_id,
                patient_id,
                admission_id,
            },
            file_id,
        )
        .await
    }

    /// Link to the backend-rendered preview of a file (does not call the API).
    pub fn preview_link(&self, file_id: &str) -> String {
        format!(
            "{}?file_id={}",
            self.build_url("preview"),
            urlencoding::encode(file_id)
        )
    }

    /// External-link delivery for `descriptor`; no bytes are fetched.
    pub fn external_link(
        &self,
        descriptor: &FileDescriptor,
    ) -> Result<ResolvedDelivery, DocumentError> {
        let file_id = descriptor
            .retrievable_id()
            .ok_or_else(|| DocumentError::FileUnavailable {
                file_name: descriptor.file_name().to_string(),
            })?;
        Ok(ResolvedDelivery::external_link(
            descriptor,
            self.preview_link(file_id),
        ))
    }

    /// Send record fields plus every attachment as one multipart request.
    pub async fn submit_record(
        &self,
        submission: &RecordSubmission,
    ) -> Result<SubmitResponse, DocumentError> {
        submission.check()?;

        let mut form = reqwest::multipart::Form::new();
        for (name, value) in submission.form_fields() {
            form = form.text(name, value);
        }
        for attachment in &submission.attachments {
            let part = reqwest::multipart::Part::bytes(attachment.data.to_vec())
                .file_name(attachment.file_name.clone())
                .mime_str(&attachment.content_type)
                .map_err(|e| {
                    DocumentError::InvalidInput(format!(
                        "Invalid content type for {}: {}",
                        attachment.file_name, e
                    ))
                })?;
            form = form.part("file", part);
        }

        let response: SubmitResponse = self.post_multipart("", form).await?;
        if !response.success {
            return Err(DocumentError::BackendRejected(
                response
                    .msg
                    .unwrap_or_else(|| "upload was not accepted".to_string()),
            ));
        }

        tracing::info!(
            patient_id = %submission.patient_id,
            admission_id = %submission.admission_id,
            files = submission.attachments.len(),
            "Record submitted"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medidocs_core::models::{Attachment, DocumentType};
    use medidocs_core::{ClientConfig, DeliveryMode};
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> ApiClient {
        ApiClient::new(&ClientConfig::with_api_url(&format!("{}/api/v1/fileupload/", server.url()))).unwrap()
    }

    #[tokio::test]
    async fn test_list_records_groups_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/fileupload/")
            .match_body(Matcher::Json(json!({"action_mode": "getlist"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "data": [
                        {"patient_id": 1, "admission_id": 1, "drive_file_id": "a", "file_name": "x.pdf", "file_type": "pdf", "hospital_id": 4},
                        {"patient_id": 1, "admission_id": 1, "drive_file_id": "b", "file_name": "y.png", "file_type": "png", "hospital_id": 4},
                        {"patient_id": 2, "admission_id": 1, "drive_file_id": "c", "file_name": "z.mp4", "file_type": "mp4", "hospital_id": 5}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let records = client_for(&server).list_records().await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].files.len(), 2);
        assert_eq!(records[0].hospital_id, "4");
        assert_eq!(records[1].files[0].file_name(), "z.mp4");
    }

    #[tokio::test]
    async fn test_list_malformed_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/fileupload/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let err = client_for(&server).list_rows().await.unwrap_err();
        assert!(matches!(err, DocumentError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_list_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/fileupload/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client_for(&server).list_rows().await.unwrap_err();
        assert!(matches!(err, DocumentError::BackendRejected(ref m) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_fetch_preview_returns_exact_bytes() {
        let payload: Vec<u8> = vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff, 0x80, 0x0a];
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/fileupload/preview")
            .match_body(Matcher::Json(json!({"drive_file_id": "1AbC"})))
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(payload.clone())
            .create_async()
            .await;

        let bytes = client_for(&server).fetch_preview("1AbC").await.unwrap();

        mock.assert_async().await;
        assert_eq!(bytes.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_retrieval_failed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/fileupload/preview")
            .with_status(404)
            .with_body("not found")
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server).fetch_preview("gone").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err,
            DocumentError::RetrievalFailed {
                file_id: "gone".to_string(),
                status: Some(404),
                message: "not found".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_transport_error_is_retrieval_failed() {
        let client = ApiClient::new(&ClientConfig::with_api_url("http://127.0.0.1:1/api/")).unwrap();

        let err = client.fetch_preview("a").await.unwrap_err();

        assert!(matches!(
            err,
            DocumentError::RetrievalFailed { status: None, ref file_id, .. } if file_id == "a"
        ));
    }

    #[tokio::test]
    async fn test_download_single_sends_record_context() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/fileupload/")
            .match_body(Matcher::Json(json!({
                "action_mode": "download-single",
                "file_id": "c",
                "patient_id": "2",
                "admission_id": "1"
            })))
            .with_status(200)
            .with_body("video-bytes")
            .create_async()
            .await;

        let bytes = client_for(&server)
            .download_single("c", "2", "1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes.as_ref(), b"video-bytes");
    }

    #[test]
    fn test_preview_link_and_external_link() {
        let client = ApiClient::new(&ClientConfig::with_api_url("http://records.local/api")).unwrap();
        assert_eq!(
            client.preview_link("a b/c"),
            "http://records.local/api/preview?file_id=a%20b%2Fc"
        );

        let descriptor = FileDescriptor::new(Some("abc".into()), "x.pdf".into(), "pdf".into());
        let resolved = client.external_link(&descriptor).unwrap();
        assert_eq!(resolved.mode, DeliveryMode::ExternalLink);
        assert_eq!(
            resolved.artifact.payload.as_uri(),
            Some("http://records.local/api/preview?file_id=abc")
        );

        let missing = FileDescriptor::new(None, "x.pdf".into(), "pdf".into());
        assert!(matches!(
            client.external_link(&missing),
            Err(DocumentError::FileUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_record_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/fileupload/")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="action_mode""#.to_string()),
                Matcher::Regex(r#"name="patient_id""#.to_string()),
                Matcher::Regex(r#"filename="rx.pdf""#.to_string()),
                Matcher::Regex("prescription".to_string()),
                Matcher::Regex("PDFBODY".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "msg": "stored"}"#)
            .create_async()
            .await;

        let submission = RecordSubmission::new("1", "2", "3", DocumentType::Prescription)
            .with_attachment(Attachment::new("rx.pdf", b"PDFBODY".to_vec()));
        let response = client_for(&server).submit_record(&submission).await.unwrap();

        mock.assert_async().await;
        assert!(response.success);
        assert_eq!(response.msg.as_deref(), Some("stored"));
    }

    #[tokio::test]
    async fn test_submit_rejected_by_backend() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/fileupload/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "msg": "duplicate admission"}"#)
            .create_async()
            .await;

        let submission = RecordSubmission::new("1", "2", "3", DocumentType::Other)
            .with_attachment(Attachment::new("note.txt", b"hello".to_vec()));
        let err = client_for(&server).submit_record(&submission).await.unwrap_err();

        assert_eq!(
            err,
            DocumentError::BackendRejected("duplicate admission".to_string())
        );
    }

    #[tokio::test]
    async fn test_submit_without_file_never_sends() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let submission = RecordSubmission::new("1", "2", "3", DocumentType::Imaging);
        let err = client_for(&server).submit_record(&submission).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, DocumentError::InvalidInput(_)));
    }
}
