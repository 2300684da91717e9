use serde::{Deserialize, Deserializer, Serialize};

/// One stored file as returned by the backend listing call.
///
/// Record-level fields (`hospital_id`, `doctor_id`, `document_type`, `remarks`) are
/// repeated on every row of the same admission. Identifier fields accept JSON numbers
/// or strings; absent or `null` values deserialize to an empty string so that no row
/// is ever dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub admission_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hospital_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub doctor_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub remarks: String,
    /// Storage handle used by the preview route.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub drive_file_id: Option<String>,
    /// Handle used by the download-single route; older rows carry only this one.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_name: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub file_type: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub file_type_tag: String,
}

impl FileUploadRow {
    /// The file's storage handle: `drive_file_id` when present and non-blank,
    /// otherwise `file_id`.
    pub fn storage_id(&self) -> Option<&str> {
        non_blank(self.drive_file_id.as_deref()).or(self.file_id.as_deref())
    }

    /// The file-type tag: `file_type`, falling back to `file_type_tag`.
    pub fn type_tag(&self) -> &str {
        non_blank(Some(&self.file_type)).unwrap_or(&self.file_type_tag)
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor::new(
            self.storage_id().map(str::to_string),
            self.file_name.clone(),
            self.type_tag().to_string(),
        )
    }
}

/// A single file belonging to an aggregated record. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    file_id: Option<String>,
    file_name: String,
    file_type_tag: String,
}

impl FileDescriptor {
    pub fn new(file_id: Option<String>, file_name: String, file_type_tag: String) -> Self {
        Self {
            file_id,
            file_name,
            file_type_tag,
        }
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// The storage handle, only when it can actually be used for retrieval.
    pub fn retrievable_id(&self) -> Option<&str> {
        self.file_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_type_tag(&self) -> &str {
        &self.file_type_tag
    }

    pub fn content_type(&self) -> &'static str {
        crate::mime::resolve(&self.file_type_tag)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn value_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_string(value).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_string(value))
}
