//! Core types for astc-dl

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{ConvertError, FetchError, ParseError};

/// Width used when formatting item identifiers in reports
pub const ITEM_ID_WIDTH: usize = 9;

/// Identifier of one convertible asset on the remote store
///
/// Holds both the string form (used verbatim for remote lookup) and its numeric value
/// (used for ordering and range compression). Identifiers compare by numeric value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    raw: String,
    value: u64,
}

impl ItemId {
    /// Parse a numeric, non-empty identifier
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let value = parse_digits(s).ok_or_else(|| ParseError::InvalidFormat {
            token: s.to_string(),
        })?;
        Ok(Self {
            raw: s.to_string(),
            value,
        })
    }

    /// Create an identifier from its numeric value, zero-padded to [`ITEM_ID_WIDTH`]
    pub fn from_value(value: u64) -> Self {
        Self {
            raw: format!("{value:0width$}", width = ITEM_ID_WIDTH),
            value,
        }
    }

    /// String form as used on the remote store
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric value
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Parse an all-ASCII-digit string into a `u64`
pub(crate) fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for ItemId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.raw
    }
}

/// A parsed request: one identifier or a contiguous run sharing a prefix
///
/// Immutable once parsed. Built by [`RangeParser`](crate::range::RangeParser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeRequest {
    /// A single identifier
    Single(ItemId),
    /// `prefix + {start..=end:02}`
    Range {
        /// Leading characters shared by every expanded identifier
        prefix: String,
        /// Numeric start suffix
        start: u64,
        /// Numeric end suffix (inclusive, strictly greater than `start`)
        end: u64,
        /// The token as the user typed it (trimmed)
        token: String,
    },
}

impl RangeRequest {
    /// The request token, suitable for captions and archive names
    pub fn token(&self) -> &str {
        match self {
            RangeRequest::Single(id) => id.as_str(),
            RangeRequest::Range { token, .. } => token,
        }
    }

    /// Whether the request denotes more than one identifier
    pub fn is_bulk(&self) -> bool {
        matches!(self, RangeRequest::Range { .. })
    }

    /// Number of identifiers the request expands to
    pub fn len(&self) -> usize {
        match self {
            RangeRequest::Single(_) => 1,
            RangeRequest::Range { start, end, .. } => (end - start + 1) as usize,
        }
    }

    /// Always false: a request names at least one identifier
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Expand into concrete identifiers in ascending order
    ///
    /// Suffixes are padded to two digits only, so a suffix past 99 grows the identifier
    /// by a digit instead of carrying into the prefix. Identifiers past `u64::MAX` are
    /// skipped; [`RangeParser`](crate::range::RangeParser) rejects such runs up front.
    pub fn expand(&self) -> Vec<ItemId> {
        match self {
            RangeRequest::Single(id) => vec![id.clone()],
            RangeRequest::Range {
                prefix, start, end, ..
            } => (*start..=*end)
                .filter_map(|i| ItemId::parse(&format!("{prefix}{i:02}")).ok())
                .collect(),
        }
    }
}

/// Which remote server a request targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerVariant {
    /// Production assets
    Live,
    /// Pre-release assets
    Advance,
}

impl ServerVariant {
    /// Name shown in captions
    pub fn display_name(&self) -> &'static str {
        match self {
            ServerVariant::Live => "Live",
            ServerVariant::Advance => "Advance",
        }
    }

    /// Command that selects this variant
    pub fn command(&self) -> &'static str {
        match self {
            ServerVariant::Live => "live",
            ServerVariant::Advance => "adv",
        }
    }
}

impl std::fmt::Display for ServerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for ServerVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/').to_ascii_lowercase().as_str() {
            "live" => Ok(ServerVariant::Live),
            "adv" | "advance" => Ok(ServerVariant::Advance),
            other => Err(format!("unknown server variant: {other}")),
        }
    }
}

/// Outcome of processing one identifier. Produced exactly once per identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Fetched and converted
    Success {
        /// Identifier
        id: ItemId,
        /// Converted image bytes
        bytes: Vec<u8>,
    },
    /// The blob could not be downloaded; conversion was not attempted
    FetchFailed {
        /// Identifier
        id: ItemId,
        /// Cause
        error: FetchError,
    },
    /// The blob was downloaded but conversion failed
    ConvertFailed {
        /// Identifier
        id: ItemId,
        /// Cause
        error: ConvertError,
    },
}

impl ItemOutcome {
    /// Identifier this outcome belongs to
    pub fn id(&self) -> &ItemId {
        match self {
            ItemOutcome::Success { id, .. }
            | ItemOutcome::FetchFailed { id, .. }
            | ItemOutcome::ConvertFailed { id, .. } => id,
        }
    }

    /// Whether the item was converted
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success { .. })
    }
}

/// Ordered outcomes of one request, read-only once the batch completes
#[must_use]
#[derive(Clone, Debug)]
pub struct BatchResult {
    token: String,
    is_bulk: bool,
    outcomes: Vec<ItemOutcome>,
}

impl BatchResult {
    pub(crate) fn new(request: &RangeRequest, outcomes: Vec<ItemOutcome>) -> Self {
        Self {
            token: request.token().to_string(),
            is_bulk: request.is_bulk(),
            outcomes,
        }
    }

    /// Request token the batch was built from
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the request denoted more than one identifier
    pub fn is_bulk(&self) -> bool {
        self.is_bulk
    }

    /// Outcomes in ascending identifier order
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Number of converted items
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Converted items as `(id, bytes)` pairs
    pub fn successes(&self) -> impl Iterator<Item = (&ItemId, &[u8])> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Success { id, bytes } => Some((id, bytes.as_slice())),
            _ => None,
        })
    }

    /// Identifiers that failed at either stage, ascending
    pub fn failed_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.id().clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
