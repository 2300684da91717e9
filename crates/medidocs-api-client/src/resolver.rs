//! Delivery resolution: fetch a file and turn it into a preview or download artifact.

use medidocs_core::models::FileDescriptor;
use medidocs_core::{DocumentError, PreviewCapabilities, ResolvedDelivery};

use crate::fetcher::DocumentFetcher;

/// Resolves file descriptors into delivery artifacts using a [`DocumentFetcher`].
///
/// Nothing is cached: each call performs a fresh fetch and encode.
#[derive(Debug, Clone)]
pub struct DeliveryResolver<F> {
    fetcher: F,
    capabilities: PreviewCapabilities,
}

impl<F: DocumentFetcher> DeliveryResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            capabilities: PreviewCapabilities::all(),
        }
    }

    /// Restrict inline previews to what the presentation layer can render.
    pub fn with_capabilities(mut self, capabilities: PreviewCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> &PreviewCapabilities {
        &self.capabilities
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn resolve(
        &self,
        descriptor: &FileDescriptor,
    ) -> Result<ResolvedDelivery, DocumentError> {
        self.resolve_for(descriptor, &self.capabilities).await
    }

    /// Resolve against an explicit set of preview capabilities.
    ///
    /// A descriptor without a retrievable id fails with `FileUnavailable` before any
    /// fetch. Fetch failures are returned unchanged.
    pub async fn resolve_for(
        &self,
        descriptor: &FileDescriptor,
        capabilities: &PreviewCapabilities,
    ) -> Result<ResolvedDelivery, DocumentError> {
        let file_id = descriptor
            .retrievable_id()
            .ok_or_else(|| DocumentError::FileUnavailable {
                file_name: descriptor.file_name().to_string(),
            })?;

        let data = self.fetcher.fetch(file_id).await.inspect_err(|e| {
            tracing::warn!(file_id, error = %e, "Document retrieval failed");
        })?;

        let resolved = ResolvedDelivery::from_bytes(descriptor, data, capabilities);
        tracing::debug!(
            file_id,
            mode = ?resolved.mode,
            content_type = %resolved.artifact.content_type,
            "Resolved delivery"
        );
        Ok(resolved)
    }
}
