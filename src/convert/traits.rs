//! Trait for blob-to-image conversion

use crate::error::ConvertError;
use async_trait::async_trait;

/// Converts one compressed-texture blob into an image
///
/// The orchestrator only sees this interface; how the conversion happens (external
/// process, library, stub) is up to the implementation.
///
/// # Examples
///
/// ```no_run
/// use astc_dl::convert::{CliConverter, Converter};
/// use astc_dl::config::ConverterConfig;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let converter = CliConverter::from_config(&ConverterConfig::default())
///     .expect("astcenc not found");
/// converter.check_available()?;
///
/// let blob = std::fs::read("902000101_rgb.astc")?;
/// let png = converter.convert(&blob).await?;
/// std::fs::write(format!("902000101.{}", converter.output_extension()), png)?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert a blob
    ///
    /// # Errors
    ///
    /// - [`ConvertError::Timeout`] if the conversion exceeds its time limit
    /// - [`ConvertError::ToolError`] on a non-zero exit or abnormal termination
    /// - [`ConvertError::NoOutput`] if the tool succeeded without writing output
    /// - [`ConvertError::ToolMissing`] if the tool cannot be executed
    async fn convert(&self, blob: &[u8]) -> Result<Vec<u8>, ConvertError>;

    /// Cheap up-front availability check, run once per batch
    ///
    /// Returns [`ConvertError::ToolMissing`] when conversion cannot work at all.
    fn check_available(&self) -> Result<(), ConvertError> {
        Ok(())
    }

    /// File extension of the produced images, without the dot
    fn output_extension(&self) -> &str;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
