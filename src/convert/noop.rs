//! No-op converter for graceful degradation

use super::traits::Converter;
use crate::error::ConvertError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Converter used when no conversion tool is available
///
/// Both the availability check and every conversion report
/// [`ConvertError::ToolMissing`], so a service can still start, parse requests and
/// answer with a clear configuration error instead of failing at construction.
///
/// # Examples
///
/// ```
/// use astc_dl::convert::{Converter, NoOpConverter};
///
/// let converter = NoOpConverter::new("astcenc");
/// assert!(converter.check_available().is_err());
/// ```
#[derive(Clone, Debug)]
pub struct NoOpConverter {
    missing: PathBuf,
    extension: String,
}

impl NoOpConverter {
    /// Create a stub that reports `missing` as the absent tool
    pub fn new(missing: impl Into<PathBuf>) -> Self {
        Self {
            missing: missing.into(),
            extension: "png".to_string(),
        }
    }

    fn error(&self) -> ConvertError {
        ConvertError::ToolMissing {
            path: self.missing.clone(),
        }
    }
}

#[async_trait]
impl Converter for NoOpConverter {
    async fn convert(&self, _blob: &[u8]) -> Result<Vec<u8>, ConvertError> {
        Err(self.error())
    }

    fn check_available(&self) -> Result<(), ConvertError> {
        Err(self.error())
    }

    fn output_extension(&self) -> &str {
        &self.extension
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_reports_tool_missing() {
        let converter = NoOpConverter::new("astcenc");

        let expected = ConvertError::ToolMissing {
            path: PathBuf::from("astcenc"),
        };
        assert_eq!(converter.check_available().unwrap_err(), expected);
        assert_eq!(converter.convert(b"blob").await.unwrap_err(), expected);
        assert_eq!(converter.name(), "noop");
        assert_eq!(converter.output_extension(), "png");
    }
}
