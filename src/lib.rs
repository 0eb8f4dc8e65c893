// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # HubSpot Connector Core
//!
//! A Rust-native core for moving records in and out of the HubSpot REST
//! API. Endpoint differences live in one data table; everything else is
//! shared plumbing.
//!
//! ## Features
//!
//! - **Profile-driven endpoints**: Twelve object types described by a single table
//! - **Pagination**: Envelope parsing, offset continuation, has-more inference
//! - **Batch and streaming reads**: One-shot drain, or long-lived polling with checkpoints
//! - **Retrying writes**: Doubling backoff under a fixed time budget
//! - **Auth**: API key or OAuth access token, plus provider credential lookup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hubspot_connector::config::SourceConfig;
//! use hubspot_connector::{ApiClient, BatchReader, EndpointTable, ObjectType, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = SourceConfig::new(ObjectType::Contacts);
//!     config.api_key = Some("demo-key".to_string());
//!
//!     let client = ApiClient::builder()
//!         .credential(config.credential()?)
//!         .build()?;
//!     let table = EndpointTable::new();
//!
//!     let mut reader = BatchReader::open(&client, &table, &config).await?;
//!     while let Some(record) = reader.next_record().await? {
//!         println!("{}: {}", record.object_type, record.object);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Connector Surface                        │
//! │  BatchReader::read_all()   StreamingPoller::spawn(RecordSink)   │
//! │  RecordSubmitter::submit(object JSON)                           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Endpoints   │ Paginate  │   Config    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ API Key  │ GET/POST  │ Profile table │ Envelope  │ Validation  │
//! │ OAuth    │ Retry     │ Read paths    │ Cursor    │ Reports     │
//! │ Refresh  │ Rate limit│ Write paths   │ Checkpoint│ Periods     │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credentials and OAuth token lookup
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Per-object-type endpoint profiles
pub mod endpoints;

/// Source, streaming, and sink configuration
pub mod config;

/// Page parsing and cursor walking
pub mod pagination;

/// Batch and streaming read entry points
pub mod source;

/// Write-side record submission
pub mod sink;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use endpoints::{EndpointTable, ObjectType};
pub use http::ApiClient;
pub use sink::RecordSubmitter;
pub use source::{BatchReader, RecordSink, StopHandle, StreamingPoller};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
