//! Range token parsing
//!
//! A token is either a single identifier (`902000101`) or a run sharing a prefix
//! (`902000101-10`). For a run, the last two characters of the left side are the start
//! suffix and everything before them is the prefix; the right side is the end suffix.

use crate::error::ParseError;
use crate::types::{ItemId, RangeRequest, parse_digits};
use tracing::debug;

/// Separator between the start and end of a run
pub const RANGE_SEPARATOR: char = '-';

/// Number of trailing characters of the left side that form the start suffix
const SUFFIX_WIDTH: usize = 2;

/// Default maximum value of `end - start`
pub const DEFAULT_MAX_SPAN: u64 = 100;

/// Turns user tokens into [`RangeRequest`]s
#[derive(Clone, Copy, Debug)]
pub struct RangeParser {
    max_span: u64,
}

impl Default for RangeParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPAN)
    }
}

impl RangeParser {
    /// Create a parser that rejects runs where `end - start > max_span`
    pub fn new(max_span: u64) -> Self {
        Self { max_span }
    }

    /// Parse a token
    ///
    /// # Errors
    ///
    /// - [`ParseError::InvalidFormat`] when either side is empty or not numeric, or when
    ///   the highest identifier of the run does not fit a `u64`
    /// - [`ParseError::EmptyRange`] when `end <= start`
    /// - [`ParseError::RangeTooLarge`] when `end - start` exceeds the maximum span
    pub fn parse(&self, token: &str) -> Result<RangeRequest, ParseError> {
        let token = token.trim();

        let Some((left, right)) = token.split_once(RANGE_SEPARATOR) else {
            return ItemId::parse(token).map(RangeRequest::Single);
        };

        let invalid = || ParseError::InvalidFormat {
            token: token.to_string(),
        };

        // Digits only, so byte offsets are char boundaries
        if parse_digits(left).is_none() {
            return Err(invalid());
        }
        let split_at = left.len().saturating_sub(SUFFIX_WIDTH);
        let (prefix, suffix) = left.split_at(split_at);
        let start = parse_digits(suffix).ok_or_else(invalid)?;
        let end = parse_digits(right).ok_or_else(invalid)?;

        if end <= start {
            return Err(ParseError::EmptyRange { start, end });
        }
        if end - start > self.max_span {
            return Err(ParseError::RangeTooLarge {
                start,
                end,
                max: self.max_span,
            });
        }

        // Expanded identifiers grow with the suffix, so the last one bounds them all
        ItemId::parse(&format!("{prefix}{end:02}")).map_err(|_| invalid())?;

        debug!(token, prefix, start, end, "parsed range token");

        Ok(RangeRequest::Range {
            prefix: prefix.to_string(),
            start,
            end,
            token: token.to_string(),
        })
    }
}
