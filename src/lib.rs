//! # docsumo - Rust client for the Docsumo document extraction API
//!
//! Builds authenticated requests against the Docsumo REST API, uploads
//! documents as multipart forms and hands back the decoded JSON bodies.
//!
//! ## Features
//!
//! - API key authentication, from code or `DOCSUMO_API_KEY`
//! - Single document upload
//! - Document listing, summary and deletion
//! - Bulk upload with per-file failure isolation: one rejected file never
//!   stops the rest of the batch
//! - Explicit document type table, refreshed on demand from the account limits
//! - Pluggable [`Transport`] so requests can be intercepted in tests
//!
//! ## Basic Usage
//!
//! ```no_run
//! use docsumo::{Config, Docsumo};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Docsumo::new(Config::new("my-api-key"))?;
//!
//!     let result = client.upload_files_with_ids(
//!         &["invoices/a.png", "invoices/b.png"],
//!         "invoice",
//!         &["id1", "id2"],
//!     )?;
//!
//!     println!("{} uploaded, {} failed", result.successes.len(), result.failures.len());
//!     for failure in &result.failures {
//!         println!("{}: {:?}", failure.metadata.title, failure.reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Document types
//!
//! ```no_run
//! use docsumo::Docsumo;
//!
//! let mut client = Docsumo::from_env()?;
//! client.refresh_document_types()?;
//!
//! // "Invoice" is now checked against the account's templates before upload
//! let body = client.upload_file("invoice.png", "Invoice", None)?;
//! println!("{}", body["data"]["doc_id"]);
//! # Ok::<(), docsumo::DocsumoError>(())
//! ```

pub mod api;
pub mod client;
pub mod document_types;
pub mod error;
pub mod response;
pub mod transport;
pub mod upload;

// Re-export main types for convenience
pub use api::{DeleteResult, Docsumo, NotDeleted};
pub use client::Config;
pub use document_types::{DocumentType, DocumentTypes};
pub use error::{DocsumoError, Result};
pub use response::{ApiResponse, ProviderError};
pub use transport::{Form, HttpRequest, HttpTransport, RequestBody, Transport, TransportResponse};
pub use upload::{
    FailureMetadata, FailureReason, UploadBatchResult, UploadFailure, UploadItem, UploadOutcome,
    UploadRequest,
};

// Re-export serde_json for convenience
pub use serde_json::json;
