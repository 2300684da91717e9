use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use super::upload_row::{FileDescriptor, FileUploadRow};

/// Identity of an aggregated record: one patient admission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub patient_id: String,
    pub admission_id: String,
}

impl RecordKey {
    pub fn new(patient_id: impl Into<String>, admission_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            admission_id: admission_id.into(),
        }
    }

    pub fn of(row: &FileUploadRow) -> Self {
        Self::new(row.patient_id.clone(), row.admission_id.clone())
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}_{}", self.patient_id, self.admission_id)
    }
}

/// All files uploaded for one patient admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub patient_id: String,
    pub admission_id: String,
    pub hospital_id: String,
    pub doctor_id: String,
    pub document_type: String,
    pub remarks: String,
    pub files: Vec<FileDescriptor>,
}

impl AggregatedRecord {
    /// Start a record from the first row seen for its key. The row's file is not added.
    pub fn from_first_row(row: &FileUploadRow) -> Self {
        Self {
            patient_id: row.patient_id.clone(),
            admission_id: row.admission_id.clone(),
            hospital_id: row.hospital_id.clone(),
            doctor_id: row.doctor_id.clone(),
            document_type: row.document_type.clone(),
            remarks: row.remarks.clone(),
            files: Vec::new(),
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.patient_id.clone(), self.admission_id.clone())
    }

    pub fn find_file(&self, file_id: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|f| f.file_id() == Some(file_id))
    }
}
