//! Error types module
//!
//! All document retrieval, listing and submission failures are unified under the
//! `DocumentError` enum. Aggregation has no failure mode and therefore no variant:
//! rows with absent record-level fields are still grouped.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like missing identifiers
    Debug,
    /// Warning level - for recoverable issues like backend failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation - defines how an error is surfaced to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "RETRIEVAL_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// User-visible notification text
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("File unavailable: {file_name} has no retrievable identifier")]
    FileUnavailable { file_name: String },

    #[error("Retrieval of {file_id} failed{}: {message}", status_suffix(.status))]
    RetrievalFailed {
        file_id: String,
        status: Option<u16>,
        message: String,
    },

    #[error("No preview renderer for content type {content_type}")]
    UnsupportedPreview { content_type: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Backend rejected request: {0}")]
    BackendRejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {}", code))
        .unwrap_or_default()
}

impl From<io::Error> for DocumentError {
    fn from(err: io::Error) -> Self {
        DocumentError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::MalformedResponse(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for DocumentError {
    fn from(err: validator::ValidationErrors) -> Self {
        DocumentError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn document_error_static_metadata(err: &DocumentError) -> (&'static str, bool, LogLevel) {
    match err {
        DocumentError::FileUnavailable { .. } => ("FILE_UNAVAILABLE", false, LogLevel::Debug),
        DocumentError::RetrievalFailed { .. } => ("RETRIEVAL_FAILED", true, LogLevel::Warn),
        DocumentError::UnsupportedPreview { .. } => {
            ("UNSUPPORTED_PREVIEW", false, LogLevel::Debug)
        }
        DocumentError::MalformedResponse(_) => ("MALFORMED_RESPONSE", false, LogLevel::Error),
        DocumentError::BackendRejected(_) => ("BACKEND_REJECTED", false, LogLevel::Warn),
        DocumentError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        DocumentError::Config(_) => ("CONFIG_ERROR", false, LogLevel::Error),
        DocumentError::Transport(_) => ("TRANSPORT_ERROR", true, LogLevel::Warn),
        DocumentError::Io(_) => ("IO_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for DocumentError {
    fn error_code(&self) -> &'static str {
        document_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        document_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        document_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            DocumentError::FileUnavailable { .. } => "File ID missing!".to_string(),
            DocumentError::RetrievalFailed { .. } => "Preview failed".to_string(),
            DocumentError::UnsupportedPreview { .. } => {
                "Cannot preview this file type.".to_string()
            }
            DocumentError::MalformedResponse(_) | DocumentError::BackendRejected(_) => {
                "Failed to fetch records from backend".to_string()
            }
            DocumentError::InvalidInput(ref msg) => msg.clone(),
            DocumentError::Config(ref msg) => msg.clone(),
            DocumentError::Transport(_) => "Backend unreachable".to_string(),
            DocumentError::Io(_) => "Local file operation failed".to_string(),
        }
    }
}
