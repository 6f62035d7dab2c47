//! # astc-dl
//!
//! Batch downloader and converter for ASTC texture assets.
//!
//! Given an item identifier (`902000101`) or a range sharing a prefix (`902000101-10`),
//! astc-dl downloads each `{id}_rgb.astc` blob, decodes it with an external `astcenc`
//! binary, and returns either the single image or one zip archive of every converted
//! image plus a condensed listing of the identifiers that failed.
//!
//! ## Design Philosophy
//!
//! - **Failures are data** - a failed download or conversion is recorded for that item
//!   and never stops the rest of the batch
//! - **Deterministic output** - items run concurrently but results keep request order
//! - **Library-first** - no chat front-end, [`ConversionService`] is the boundary one
//!   plugs into
//!
//! ## Quick Start
//!
//! ```no_run
//! use astc_dl::{Config, ConversionService, Response, ServerVariant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ConversionService::new(Config::from_env()?)?;
//!
//!     match service.handle(0, ServerVariant::Live, Some("902000101-10")).await {
//!         Response::Archive { file_name, bytes, failure_report, .. } => {
//!             std::fs::write(file_name, bytes)?;
//!             if let Some(report) = failure_report {
//!                 println!("{report}");
//!             }
//!         }
//!         Response::Image { file_name, bytes, .. } => std::fs::write(file_name, bytes)?,
//!         Response::Failure { message } => eprintln!("{message}"),
//!         Response::Rejected { .. } => {}
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Zip packaging of converted images
pub mod archive;
/// Batch orchestration
pub mod batch;
/// Configuration types
pub mod config;
/// Blob-to-image conversion
pub mod convert;
/// Error types
pub mod error;
/// Failed-identifier range compression
pub mod failure_ranges;
/// Blob download
pub mod fetch;
/// Range token parsing
pub mod range;
/// Front-end request handling
pub mod service;
/// Core types
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use archive::ArchiveBuilder;
pub use batch::BatchOrchestrator;
pub use config::{AccessConfig, BatchConfig, Config, ConverterConfig, QualityMode, ServerConfig};
pub use convert::{CliConverter, Converter, NoOpConverter};
pub use error::{ArchiveError, ConvertError, Error, FetchError, ParseError, Result};
pub use failure_ranges::{FailureRange, format_failure_report};
pub use fetch::{HttpItemFetcher, ItemFetcher};
pub use range::RangeParser;
pub use service::{ConversionService, Response, help_text};
pub use types::{BatchResult, ItemId, ItemOutcome, RangeRequest, ServerVariant};
