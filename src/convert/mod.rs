//! Blob-to-image conversion
//!
//! The external conversion tool sits behind the [`Converter`] trait so the batch
//! pipeline never deals with process spawning directly.
//!
//! - [`CliConverter`]: runs the external `astcenc` binary
//! - [`NoOpConverter`]: stub used when the binary is unavailable
//!
//! ## Usage
//!
//! ```no_run
//! use astc_dl::config::ConverterConfig;
//! use astc_dl::convert::{CliConverter, Converter, NoOpConverter};
//! use std::sync::Arc;
//!
//! let config = ConverterConfig::default();
//! let converter: Arc<dyn Converter> = match CliConverter::from_config(&config) {
//!     Some(cli) => Arc::new(cli),
//!     None => Arc::new(NoOpConverter::new(&config.binary_name)),
//! };
//! ```

mod cli;
mod noop;
mod traits;

pub use cli::CliConverter;
pub use noop::NoOpConverter;
pub use traits::Converter;

use crate::config::ConverterConfig;
use std::sync::Arc;
use tracing::warn;

/// Pick the converter for a configuration, falling back to [`NoOpConverter`]
pub fn converter_from_config(config: &ConverterConfig) -> Arc<dyn Converter> {
    match CliConverter::from_config(config) {
        Some(cli) => Arc::new(cli),
        None => {
            warn!(
                binary = %config.binary_name,
                "conversion tool not found, conversions will be rejected"
            );
            Arc::new(NoOpConverter::new(&config.binary_name))
        }
    }
}
