//! Delivery mode policy and artifact construction.
//!
//! Everything here is pure: given a descriptor and the bytes already fetched, decide how
//! the file is handed to the user and build the artifact for it.

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::models::FileDescriptor;

/// Suggested name when a descriptor carries no usable file name.
pub const FALLBACK_FILE_NAME: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    InlinePreview,
    ForcedDownload,
    ExternalLink,
}

/// Either the raw bytes or a URI the host can open directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Bytes),
    Uri(String),
}

impl Payload {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Bytes(b) => Some(b),
            Payload::Uri(_) => None,
        }
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Payload::Uri(u) => Some(u),
            Payload::Bytes(_) => None,
        }
    }
}

/// Transient value handed to the preview surface or the download action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryArtifact {
    pub file_name: String,
    pub content_type: String,
    pub payload: Payload,
}

impl DeliveryArtifact {
    /// The file's bytes, decoding an inline data URI when needed.
    pub fn bytes(&self) -> Result<Bytes, DocumentError> {
        match &self.payload {
            Payload::Bytes(b) => Ok(b.clone()),
            Payload::Uri(uri) if uri.starts_with("data:") => {
                decode_data_uri(uri).map(|(_, data)| Bytes::from(data))
            }
            Payload::Uri(uri) => Err(DocumentError::InvalidInput(format!(
                "{} is an external link, not an in-memory payload",
                uri
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDelivery {
    pub artifact: DeliveryArtifact,
    pub mode: DeliveryMode,
}

/// Which inline renderers the presentation layer has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewCapabilities {
    pub pdf: bool,
    pub image: bool,
    pub video: bool,
}

impl Default for PreviewCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl PreviewCapabilities {
    pub const fn all() -> Self {
        Self {
            pdf: true,
            image: true,
            video: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            pdf: false,
            image: false,
            video: false,
        }
    }

    pub fn can_render(&self, content_type: &str) -> bool {
        let ct = content_type.to_ascii_lowercase();
        (self.pdf && ct == "application/pdf")
            || (self.image && ct.starts_with("image/"))
            || (self.video && ct.starts_with("video/"))
    }

    /// Downgrade `mode` when the surface has no renderer for `content_type`.
    pub fn negotiate(&self, mode: DeliveryMode, content_type: &str) -> Result<DeliveryMode, DocumentError> {
        if mode == DeliveryMode::InlinePreview && !self.can_render(content_type) {
            return Err(DocumentError::UnsupportedPreview {
                content_type: content_type.to_string(),
            });
        }
        Ok(mode)
    }
}

/// Pick the delivery mode for a resolved content type.
///
/// PDFs, images and video preview inline; everything else, including
/// `application/octet-stream`, is downloaded.
pub fn select_mode(content_type: &str) -> DeliveryMode {
    let ct = content_type.trim().to_ascii_lowercase();
    if ct == "application/pdf" || ct.starts_with("video/") || ct.starts_with("image/") {
        DeliveryMode::InlinePreview
    } else {
        DeliveryMode::ForcedDownload
    }
}

/// `data:{content_type};base64,{payload}`
pub fn encode_data_uri(content_type: &str, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{}", content_type, encoded)
}

/// Inverse of [`encode_data_uri`]: returns the content type and the exact original bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), DocumentError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| DocumentError::InvalidInput("not a data URI".to_string()))?;
    let (header, encoded) = rest
        .split_once(',')
        .ok_or_else(|| DocumentError::InvalidInput("data URI has no payload".to_string()))?;
    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| DocumentError::InvalidInput("data URI is not base64".to_string()))?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| DocumentError::InvalidInput(format!("Invalid base64 payload: {}", e)))?;
    Ok((content_type.to_string(), data))
}

fn suggested_name(descriptor: &FileDescriptor) -> String {
    let name = descriptor.file_name();
    if name.trim().is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}

impl ResolvedDelivery {
    /// Build the artifact for bytes already fetched for `descriptor`.
    ///
    /// When the policy picks an inline preview the surface cannot render, the file is
    /// delivered as a download instead.
    pub fn from_bytes(
        descriptor: &FileDescriptor,
        data: Bytes,
        capabilities: &PreviewCapabilities,
    ) -> Self {
        let content_type = descriptor.content_type();
        let mode = match capabilities.negotiate(select_mode(content_type), content_type) {
            Ok(mode) => mode,
            Err(err) => {
                tracing::debug!(
                    file_name = descriptor.file_name(),
                    error = %err,
                    "Falling back to download"
                );
                DeliveryMode::ForcedDownload
            }
        };

        let payload = match mode {
            DeliveryMode::InlinePreview => Payload::Uri(encode_data_uri(content_type, &data)),
            _ => Payload::Bytes(data),
        };

        Self {
            artifact: DeliveryArtifact {
                file_name: suggested_name(descriptor),
                content_type: content_type.to_string(),
                payload,
            },
            mode,
        }
    }

    /// Artifact pointing the host at a backend-served preview link.
    pub fn external_link(descriptor: &FileDescriptor, link: String) -> Self {
        Self {
            artifact: DeliveryArtifact {
                file_name: suggested_name(descriptor),
                content_type: descriptor.content_type().to_string(),
                payload: Payload::Uri(link),
            },
            mode: DeliveryMode::ExternalLink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, tag: &str) -> FileDescriptor {
        FileDescriptor::new(Some("id".to_string()), name.to_string(), tag.to_string())
    }

    #[test]
    fn test_select_mode_policy() {
        assert_eq!(select_mode("application/pdf"), DeliveryMode::InlinePreview);
        assert_eq!(select_mode("video/mp4"), DeliveryMode::InlinePreview);
        assert_eq!(select_mode("video/x-matroska"), DeliveryMode::InlinePreview);
        assert_eq!(select_mode("image/png"), DeliveryMode::InlinePreview);
        assert_eq!(select_mode("audio/mpeg"), DeliveryMode::ForcedDownload);
        assert_eq!(select_mode("application/octet-stream"), DeliveryMode::ForcedDownload);
        assert_eq!(select_mode(""), DeliveryMode::ForcedDownload);
    }

    #[test]
    fn test_select_mode_is_deterministic_over_resolver_output() {
        for tag in [
            "pdf", "png", "jpg", "jpeg", "gif", "webp", "mp4", "webm", "mp3", "avi", "mov",
            "mkv", "xyz",
        ] {
            let ct = crate::mime::resolve(tag);
            assert_eq!(select_mode(ct), select_mode(ct));
        }
    }

    #[test]
    fn test_data_uri_round_trip() {
        let mut samples: Vec<Vec<u8>> = vec![Vec::new(), vec![0], vec![255, 0, 255], b"%PDF-1.7\n".to_vec()];
        samples.push((0..=255u8).collect());
        samples.push((0..1000u32).map(|i| (i * 31 % 251) as u8).collect());

        for data in samples {
            let uri = encode_data_uri("image/png", &data);
            let (ct, decoded) = decode_data_uri(&uri).unwrap();
            assert_eq!(ct, "image/png");
            assert_eq!(decoded, data);
        }
    }

    #[test]
    fn test_decode_rejects_non_data_uri() {
        assert!(decode_data_uri("https://example.com/x").is_err());
        assert!(decode_data_uri("data:image/png,raw").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_inline_artifact_for_image() {
        let data = Bytes::from_static(b"\x89PNG\r\n\x1a\n");
        let resolved = ResolvedDelivery::from_bytes(
            &descriptor("y.png", "png"),
            data.clone(),
            &PreviewCapabilities::all(),
        );

        assert_eq!(resolved.mode, DeliveryMode::InlinePreview);
        assert_eq!(resolved.artifact.content_type, "image/png");
        assert!(resolved.artifact.payload.as_uri().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(resolved.artifact.bytes().unwrap(), data);
    }

    #[test]
    fn test_download_artifact_for_unknown_type() {
        let data = Bytes::from_static(b"PK\x03\x04");
        let resolved = ResolvedDelivery::from_bytes(
            &descriptor("", "docx"),
            data.clone(),
            &PreviewCapabilities::all(),
        );

        assert_eq!(resolved.mode, DeliveryMode::ForcedDownload);
        assert_eq!(resolved.artifact.file_name, FALLBACK_FILE_NAME);
        assert_eq!(resolved.artifact.content_type, "application/octet-stream");
        assert_eq!(resolved.artifact.payload.as_bytes(), Some(&data));
    }

    #[test]
    fn test_suggested_name_keeps_descriptor_name() {
        let data = Bytes::from_static(b"raw");
        let caps = PreviewCapabilities::all();

        let resolved = ResolvedDelivery::from_bytes(&descriptor(" report .bin ", "bin"), data.clone(), &caps);
        assert_eq!(resolved.artifact.file_name, " report .bin ");

        let resolved = ResolvedDelivery::from_bytes(&descriptor("   ", "bin"), data, &caps);
        assert_eq!(resolved.artifact.file_name, FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_unsupported_preview_falls_back_to_download() {
        let caps = PreviewCapabilities {
            pdf: true,
            image: true,
            video: false,
        };
        assert!(matches!(
            caps.negotiate(DeliveryMode::InlinePreview, "video/mp4"),
            Err(DocumentError::UnsupportedPreview { .. })
        ));

        let resolved = ResolvedDelivery::from_bytes(
            &descriptor("z.mp4", "mp4"),
            Bytes::from_static(b"ftyp"),
            &caps,
        );
        assert_eq!(resolved.mode, DeliveryMode::ForcedDownload);
        assert_eq!(resolved.artifact.file_name, "z.mp4");
        assert!(resolved.artifact.payload.as_bytes().is_some());
    }

    #[test]
    fn test_external_link_artifact() {
        let resolved = ResolvedDelivery::external_link(
            &descriptor("x.pdf", "pdf"),
            "http://host/preview?file_id=id".to_string(),
        );
        assert_eq!(resolved.mode, DeliveryMode::ExternalLink);
        assert_eq!(resolved.artifact.payload.as_uri(), Some("http://host/preview?file_id=id"));
        assert!(resolved.artifact.bytes().is_err());
    }
}
