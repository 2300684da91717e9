use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DocumentError;

/// Kind of clinical document attached to an admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "x-ray")]
    XRay,
    #[serde(rename = "diagnostic_report")]
    DiagnosticReport,
    #[serde(rename = "prescription")]
    Prescription,
    #[serde(rename = "consent_form")]
    ConsentForm,
    #[serde(rename = "surgical_note")]
    SurgicalNote,
    #[serde(rename = "pathological")]
    Pathological,
    #[serde(rename = "imaging")]
    Imaging,
    #[serde(rename = "other")]
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        DocumentType::XRay,
        DocumentType::DiagnosticReport,
        DocumentType::Prescription,
        DocumentType::ConsentForm,
        DocumentType::SurgicalNote,
        DocumentType::Pathological,
        DocumentType::Imaging,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::XRay => "x-ray",
            DocumentType::DiagnosticReport => "diagnostic_report",
            DocumentType::Prescription => "prescription",
            DocumentType::ConsentForm => "consent_form",
            DocumentType::SurgicalNote => "surgical_note",
            DocumentType::Pathological => "pathological",
            DocumentType::Imaging => "imaging",
            DocumentType::Other => "other",
        }
    }
}

impl FromStr for DocumentType {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| DocumentError::InvalidInput(format!("Invalid document type: {}", s)))
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A file to be sent along with a record submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl Attachment {
    /// Build an attachment, deriving the content type from the file extension.
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type =
            crate::mime::resolve_opt(crate::mime::tag_from_file_name(&file_name)).to_string();
        Self {
            file_name,
            content_type,
            data: data.into(),
        }
    }
}

/// Record-level fields plus attachments, sent as one multipart request.
#[derive(Debug, Clone, Validate)]
pub struct RecordSubmission {
    #[validate(length(min = 1, message = "Patient ID is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "Admission ID is required"))]
    pub admission_id: String,
    #[validate(length(min = 1, message = "Hospital ID is required"))]
    pub hospital_id: String,
    pub doctor_id: String,
    pub document_type: DocumentType,
    pub remarks: String,
    #[validate(length(min = 1, message = "At least one file is required"))]
    pub attachments: Vec<Attachment>,
}

impl RecordSubmission {
    pub fn new(
        patient_id: &str,
        admission_id: &str,
        hospital_id: &str,
        document_type: DocumentType,
    ) -> Self {
        Self {
            patient_id: patient_id.trim().to_string(),
            admission_id: admission_id.trim().to_string(),
            hospital_id: hospital_id.trim().to_string(),
            doctor_id: String::new(),
            document_type,
            remarks: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_doctor(mut self, doctor_id: &str) -> Self {
        self.doctor_id = doctor_id.trim().to_string();
        self
    }

    pub fn with_remarks(mut self, remarks: &str) -> Self {
        self.remarks = remarks.to_string();
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Required-field presence check, run before anything is sent.
    pub fn check(&self) -> Result<(), DocumentError> {
        self.validate().map_err(DocumentError::from)
    }

    /// Text fields in the order the backend expects them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action_mode", "upload".to_string()),
            ("patient_id", self.patient_id.clone()),
            ("admission_id", self.admission_id.clone()),
            ("hospital_id", self.hospital_id.clone()),
            ("document_type", self.document_type.to_string()),
            ("remarks", self.remarks.clone()),
            ("doctor_id", self.doctor_id.clone()),
        ]
    }
}

/// Backend reply to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}
