//! Normalization of the listing response body.
//!
//! The backend has returned the row list under several shapes over time. They are
//! tried in a fixed priority order and anything else is rejected as malformed.

use serde_json::Value;

use super::upload_row::FileUploadRow;
use crate::error::DocumentError;

/// Shape the rows were found under, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `{"data": [...]}`
    Data,
    /// `{"data": {"data": [...]}}`
    NestedData,
    /// `{"records": [...]}` or `{"data": {"records": [...]}}`
    Records,
    /// `[...]`
    BareArray,
}

/// Extract the upload rows from a listing response body.
pub fn parse_list_response(body: Value) -> Result<Vec<FileUploadRow>, DocumentError> {
    let (shape, rows) = locate_rows(&body)?;
    tracing::debug!(?shape, rows = rows.len(), "Parsed list response");

    rows.iter()
        .cloned()
        .map(serde_json::from_value::<FileUploadRow>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DocumentError::MalformedResponse(format!("Invalid upload row: {}", e)))
}

fn locate_rows(body: &Value) -> Result<(ListShape, &Vec<Value>), DocumentError> {
    if let Some(obj) = body.as_object() {
        if obj.get("success").and_then(Value::as_bool) == Some(false) {
            let message = obj
                .get("msg")
                .or_else(|| obj.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("listing was not successful");
            return Err(DocumentError::BackendRejected(message.to_string()));
        }
    }

    let data = body.get("data");

    if let Some(rows) = data.and_then(Value::as_array) {
        return Ok((ListShape::Data, rows));
    }
    if let Some(rows) = data.and_then(|d| d.get("data")).and_then(Value::as_array) {
        return Ok((ListShape::NestedData, rows));
    }
    if let Some(rows) = body
        .get("records")
        .or_else(|| data.and_then(|d| d.get("records")))
        .and_then(Value::as_array)
    {
        return Ok((ListShape::Records, rows));
    }
    if let Some(rows) = body.as_array() {
        return Ok((ListShape::BareArray, rows));
    }

    Err(DocumentError::MalformedResponse(
        "no upload rows found under data, data.data, records or a bare array".to_string(),
    ))
}
