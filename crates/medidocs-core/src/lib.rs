//! Medidocs Core Library
//!
//! This crate provides the domain models, error types, configuration and the pure
//! document logic (record aggregation, MIME resolution, delivery policy, preview
//! session state) shared by the API client and the CLI.

pub mod aggregate;
pub mod config;
pub mod delivery;
pub mod error;
pub mod mime;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use aggregate::aggregate;
pub use config::ClientConfig;
pub use delivery::{
    decode_data_uri, encode_data_uri, select_mode, DeliveryArtifact, DeliveryMode, Payload,
    PreviewCapabilities, ResolvedDelivery, FALLBACK_FILE_NAME,
};
pub use error::{DocumentError, ErrorMetadata, LogLevel};
pub use session::{PreviewSession, PreviewState, RequestTicket, TemporaryUri};
