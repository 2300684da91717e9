//! Records view: the interaction layer's state for browsing and previewing.
//!
//! The view owns the aggregated record list, the loading flag, the preview session and
//! a queue of user-visible notifications. A failed preview never touches the record
//! list, and a failed refresh keeps the previous one.

use async_trait::async_trait;
use medidocs_core::models::{AggregatedRecord, FileDescriptor, FileUploadRow};
use medidocs_core::{
    aggregate, DocumentError, ErrorMetadata, LogLevel, PreviewSession, PreviewState, RequestTicket,
    ResolvedDelivery,
};

use crate::fetcher::DocumentFetcher;
use crate::resolver::DeliveryResolver;
use crate::ApiClient;

/// Source of the flat upload rows.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn list_rows(&self) -> Result<Vec<FileUploadRow>, DocumentError>;
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn list_rows(&self) -> Result<Vec<FileUploadRow>, DocumentError> {
        ApiClient::list_rows(self).await
    }
}

/// Message for the user, raised by a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: LogLevel,
    pub code: &'static str,
    pub message: String,
}

impl From<&DocumentError> for Notification {
    fn from(err: &DocumentError) -> Self {
        Self {
            level: err.log_level(),
            code: err.error_code(),
            message: err.client_message(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordsView {
    records: Vec<AggregatedRecord>,
    loading: bool,
    preview: PreviewSession,
    notifications: Vec<Notification>,
}

impl RecordsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AggregatedRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn preview(&self) -> &PreviewSession {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewSession {
        &mut self.preview
    }

    /// Drain pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Rebuild the record list from a fresh listing.
    pub async fn refresh<S: RecordSource + ?Sized>(&mut self, source: &S) -> Result<(), DocumentError> {
        self.loading = true;
        let result = source.list_rows().await;
        self.loading = false;

        match result {
            Ok(rows) => {
                self.records = aggregate(&rows);
                tracing::info!(records = self.records.len(), rows = rows.len(), "Records refreshed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch records");
                self.notify(&err);
                Err(err)
            }
        }
    }

    /// Preview the `file_index`-th file of the `record_index`-th record.
    pub async fn preview_file<F: DocumentFetcher>(
        &mut self,
        resolver: &DeliveryResolver<F>,
        record_index: usize,
        file_index: usize,
    ) -> Result<&PreviewState, DocumentError> {
        let descriptor = self
            .records
            .get(record_index)
            .and_then(|r| r.files.get(file_index))
            .cloned()
            .ok_or_else(|| {
                DocumentError::InvalidInput(format!(
                    "No file {} in record {}",
                    file_index, record_index
                ))
            })?;

        Ok(self.preview_descriptor(resolver, &descriptor).await)
    }

    /// Run one preview request for `descriptor` through the session.
    pub async fn preview_descriptor<F: DocumentFetcher>(
        &mut self,
        resolver: &DeliveryResolver<F>,
        descriptor: &FileDescriptor,
    ) -> &PreviewState {
        let ticket = self.preview.begin();
        let result = resolver.resolve(descriptor).await;
        self.finish_preview(ticket, result)
    }

    /// Hand a request outcome to the session. Failures are only reported when the
    /// session accepted them; stale or closed results stay silent.
    pub fn finish_preview(
        &mut self,
        ticket: RequestTicket,
        result: Result<ResolvedDelivery, DocumentError>,
    ) -> &PreviewState {
        let failure = result.as_ref().err().cloned();
        if self.preview.complete(ticket, result) {
            if let Some(err) = failure {
                tracing::warn!(code = err.error_code(), error = %err, "Preview failed");
                self.notify(&err);
            }
        }
        self.preview.state()
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
    }

    fn notify(&mut self, err: &DocumentError) {
        self.notifications.push(Notification::from(err));
    }
}
