//! Error types for astc-dl
//!
//! Errors fall into two groups:
//! - Request-level errors ([`Error`], [`ParseError`], [`ArchiveError`]) that fail the whole
//!   request with a single user-visible message
//! - Per-item errors ([`FetchError`], [`ConvertError`]) that are recorded as data inside
//!   [`ItemOutcome`](crate::types::ItemOutcome) and never abort a batch

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for astc-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for astc-dl
///
/// Only request-level failures are represented here. A failed fetch or conversion of a
/// single item is not an `Error`; it is an [`ItemOutcome`](crate::types::ItemOutcome).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "ALLOWED_GROUP_ID")
        key: Option<String>,
    },

    /// The request token could not be turned into item identifiers
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The conversion tool is not available at all
    #[error("conversion tool not found: {}", path.display())]
    ToolMissing {
        /// The path (or bare binary name) that could not be executed
        path: PathBuf,
    },

    /// Packaging the converted images failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A bulk request produced no converted images
    #[error("no items could be converted for {token}")]
    NothingSucceeded {
        /// The original request token
        token: String,
    },

    /// The request came from an origin outside the allow-list
    #[error("access denied for origin {origin}")]
    AccessDenied {
        /// The rejected origin identifier
        origin: i64,
    },

    /// HTTP client construction or transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub(crate) fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code for front-ends that need to branch on the failure kind
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Parse(ParseError::InvalidFormat { .. }) => "invalid_range",
            Error::Parse(ParseError::EmptyRange { .. }) => "empty_range",
            Error::Parse(ParseError::RangeTooLarge { .. }) => "range_too_large",
            Error::ToolMissing { .. } => "tool_missing",
            Error::Archive(_) => "archive_failed",
            Error::NothingSucceeded { .. } => "nothing_succeeded",
            Error::AccessDenied { .. } => "access_denied",
            Error::Network(_) => "network_error",
        }
    }
}

/// Errors raised while parsing a range token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Either side of the token is empty or not numeric
    #[error("invalid item id or range: {token:?}")]
    InvalidFormat {
        /// The offending token (or token half)
        token: String,
    },

    /// The end of the range is not greater than its start
    #[error("range end {end} must be greater than start {start}")]
    EmptyRange {
        /// Numeric start suffix
        start: u64,
        /// Numeric end
        end: u64,
    },

    /// The range spans more items than a single batch may hold
    #[error("range {start}-{end} spans more than {max} items")]
    RangeTooLarge {
        /// Numeric start suffix
        start: u64,
        /// Numeric end
        end: u64,
        /// Configured maximum span
        max: u64,
    },
}

/// Per-item failure while downloading a blob
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The remote store answered with a non-2xx status
    #[error("server returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response without any body bytes
    #[error("server returned an empty body")]
    EmptyBody,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Per-item failure while running the conversion tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The tool binary could not be executed
    #[error("conversion tool not found: {}", path.display())]
    ToolMissing {
        /// The path that failed to execute
        path: PathBuf,
    },

    /// The tool exceeded its wall-clock limit and was killed
    #[error("conversion timed out after {after:?}")]
    Timeout {
        /// The configured timeout
        after: Duration,
    },

    /// The tool exited unsuccessfully or was terminated by a signal
    #[error("conversion tool failed (exit code {exit_code:?}): {stderr}")]
    ToolError {
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured stderr text, trimmed
        stderr: String,
    },

    /// The tool reported success but wrote no output file
    #[error("conversion tool produced no output file")]
    NoOutput,

    /// Scratch file handling failed
    #[error("conversion I/O error: {0}")]
    Io(String),
}

/// Errors raised while packaging converted images
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No entries were given to package
    #[error("no entries to archive")]
    Empty,

    /// The zip writer rejected an entry or failed to finish
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry data failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_map_to_distinct_codes() {
        let invalid: Error = ParseError::InvalidFormat {
            token: "abc".into(),
        }
        .into();
        let empty: Error = ParseError::EmptyRange { start: 5, end: 5 }.into();
        let large: Error = ParseError::RangeTooLarge {
            start: 0,
            end: 150,
            max: 100,
        }
        .into();

        assert_eq!(invalid.error_code(), "invalid_range");
        assert_eq!(empty.error_code(), "empty_range");
        assert_eq!(large.error_code(), "range_too_large");
    }

    #[test]
    fn test_parse_error_display_is_transparent() {
        let err: Error = ParseError::EmptyRange { start: 10, end: 3 }.into();
        assert_eq!(err.to_string(), "range end 3 must be greater than start 10");
    }

    #[test]
    fn test_config_helper_records_key() {
        let err = Error::config("ALLOWED_GROUP_ID", "not an integer");
        match err {
            Error::Config { message, key } => {
                assert_eq!(message, "not an integer");
                assert_eq!(key.as_deref(), Some("ALLOWED_GROUP_ID"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_error_includes_stderr_in_message() {
        let err = ConvertError::ToolError {
            exit_code: Some(1),
            stderr: "ERROR: Unknown block size".into(),
        };
        assert!(err.to_string().contains("Unknown block size"));
        assert!(err.to_string().contains("Some(1)"));
    }

    #[test]
    fn test_tool_missing_is_reported_as_its_own_code() {
        let err = Error::ToolMissing {
            path: PathBuf::from("astcenc"),
        };
        assert_eq!(err.error_code(), "tool_missing");
        assert_eq!(err.to_string(), "conversion tool not found: astcenc");
    }
}
