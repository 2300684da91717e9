//! Data models for the application
//!
//! Wire rows from the backend, aggregated records, submissions and the response
//! normalizer for the listing call.

mod record;
pub mod response;
mod submission;
mod upload_row;

// Re-export all models for convenient imports
pub use record::*;
pub use response::{parse_list_response, ListShape};
pub use submission::*;
pub use upload_row::*;
