//! Preview session state.
//!
//! One `PreviewSession` belongs to the interaction layer and owns whatever is currently
//! displayed, including any temporary file materialized for it. Every request gets a
//! ticket; only the latest ticket of a still-open session may change what is shown.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::TempPath;

use crate::delivery::ResolvedDelivery;
use crate::error::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Fetching,
    Resolved(ResolvedDelivery),
    Failed(DocumentError),
}

/// Identifies one preview/download request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

/// A local file standing in for an object URL. Deleted when revoked or dropped.
#[derive(Debug)]
pub struct TemporaryUri {
    path: TempPath,
}

impl TemporaryUri {
    /// Write `data` to a fresh temp file whose extension follows `file_name`.
    pub fn create(file_name: &str, data: &[u8]) -> Result<Self, DocumentError> {
        let suffix = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("medidocs-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }

    pub fn revoke(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
        }
    }

    /// Revoke on a background task once `delay` has elapsed. Requires a Tokio runtime.
    pub fn revoke_after(self, delay: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            self.revoke();
        })
    }
}

#[derive(Debug)]
pub struct PreviewSession {
    state: PreviewState,
    generation: u64,
    temporary: Option<TemporaryUri>,
}

impl Default for PreviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSession {
    pub fn new() -> Self {
        Self {
            state: PreviewState::Idle,
            generation: 0,
            temporary: None,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.state, PreviewState::Fetching)
    }

    pub fn current(&self) -> Option<&ResolvedDelivery> {
        match &self.state {
            PreviewState::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&DocumentError> {
        match &self.state {
            PreviewState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Start a new request. Whatever was displayed is released first.
    pub fn begin(&mut self) -> RequestTicket {
        self.release();
        self.generation += 1;
        self.state = PreviewState::Fetching;
        RequestTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of a request. Returns false when the result arrived for a
    /// request that was superseded or closed, in which case it is discarded.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<ResolvedDelivery, DocumentError>,
    ) -> bool {
        if ticket.generation != self.generation || !self.is_fetching() {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale preview result"
            );
            return false;
        }

        self.state = match result {
            Ok(resolved) => PreviewState::Resolved(resolved),
            Err(err) => PreviewState::Failed(err),
        };
        true
    }

    /// Close the preview: back to idle, pending results discarded, resources released.
    pub fn close(&mut self) {
        self.release();
        self.generation += 1;
        self.state = PreviewState::Idle;
    }

    /// Write the displayed artifact to a temporary file owned by this session and return
    /// its URI. Repeated calls reuse the same file until the session moves on.
    pub fn materialize(&mut self) -> Result<String, DocumentError> {
        if let Some(temp) = &self.temporary {
            return Ok(temp.uri());
        }

        let resolved = self.current().ok_or_else(|| {
            DocumentError::InvalidInput("no resolved preview to materialize".to_string())
        })?;
        let data = resolved.artifact.bytes()?;
        let temp = TemporaryUri::create(&resolved.artifact.file_name, &data)?;
        let uri = temp.uri();
        self.temporary = Some(temp);
        Ok(uri)
    }

    fn release(&mut self) {
        if let Some(temp) = self.temporary.take() {
            temp.revoke();
        }
    }
}
