//! Compression of failed identifiers into contiguous ranges for reporting
//!
//! `{5, 6, 7, 10}` becomes `000000005-000000007` and `000000010`. The output is for
//! people to read and is never parsed back into identifiers.

use crate::types::{ITEM_ID_WIDTH, ItemId};

/// A maximal run of consecutive failed identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureRange {
    /// First identifier in the run
    pub start: u64,
    /// Last identifier in the run (equal to `start` for a lone failure)
    pub end: u64,
}

impl FailureRange {
    /// Number of identifiers in the run
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false: a run holds at least one identifier
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the run covers `value`
    pub fn contains(&self, value: u64) -> bool {
        (self.start..=self.end).contains(&value)
    }
}

impl std::fmt::Display for FailureRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{:0w$}", self.start, w = ITEM_ID_WIDTH)
        } else {
            write!(
                f,
                "{:0w$}-{:0w$}",
                self.start,
                self.end,
                w = ITEM_ID_WIDTH
            )
        }
    }
}

/// Merge failed identifiers into ascending, maximal runs
///
/// Duplicates are ignored. Empty input yields no ranges.
pub fn compress(failed: &[ItemId]) -> Vec<FailureRange> {
    let mut values: Vec<u64> = failed.iter().map(ItemId::value).collect();
    values.sort_unstable();
    values.dedup();

    let mut ranges = Vec::new();
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return ranges;
    };

    let mut current = FailureRange {
        start: first,
        end: first,
    };
    for value in iter {
        if current.end.checked_add(1) == Some(value) {
            current.end = value;
        } else {
            ranges.push(current);
            current = FailureRange {
                start: value,
                end: value,
            };
        }
    }
    ranges.push(current);
    ranges
}

/// Compress and format failed identifiers as report tokens
pub fn compress_to_tokens(failed: &[ItemId]) -> Vec<String> {
    compress(failed).iter().map(ToString::to_string).collect()
}

/// Render a failure listing with one token per line, or `None` when nothing failed
pub fn format_failure_report(failed: &[ItemId]) -> Option<String> {
    let tokens = compress_to_tokens(failed);
    if tokens.is_empty() {
        return None;
    }
    Some(format!("Failed IDs:\n{}", tokens.join("\n")))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn ids(values: &[u64]) -> Vec<ItemId> {
        values.iter().copied().map(ItemId::from_value).collect()
    }

    fn expand(ranges: &[FailureRange]) -> BTreeSet<u64> {
        ranges.iter().flat_map(|r| r.start..=r.end).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(compress(&[]).is_empty());
        assert_eq!(format_failure_report(&[]), None);
    }

    #[test]
    fn merges_consecutive_runs() {
        let tokens = compress_to_tokens(&ids(&[5, 6, 7, 10]));
        assert_eq!(tokens, vec!["000000005-000000007", "000000010"]);
    }

    #[test]
    fn unsorted_and_duplicate_input() {
        let ranges = compress(&ids(&[10, 7, 5, 6, 7, 12, 11]));
        assert_eq!(
            ranges,
            vec![
                FailureRange { start: 5, end: 7 },
                FailureRange { start: 10, end: 12 },
            ]
        );
    }

    #[test]
    fn all_isolated_ids_stay_single() {
        let tokens = compress_to_tokens(&ids(&[902000101, 902000103, 902000105]));
        assert_eq!(tokens, vec!["902000101", "902000103", "902000105"]);
    }

    #[test]
    fn single_run_covers_everything() {
        let ranges = compress(&ids(&(902000101..=902000199).collect::<Vec<_>>()));
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].len(), 99);
        assert_eq!(ranges[0].to_string(), "902000101-902000199");
    }

    #[test]
    fn re_expansion_matches_input_set() {
        let inputs: [&[u64]; 4] = [
            &[1],
            &[1, 2, 3, 4],
            &[0, 2, 4, 5, 6, 9, 10, 20],
            &[902000199, 902000200, 902000201, 902000300],
        ];
        for input in inputs {
            let ranges = compress(&ids(input));
            let expected: BTreeSet<u64> = input.iter().copied().collect();
            assert_eq!(expand(&ranges), expected, "input {input:?}");
            // Maximal: adjacent runs are never mergeable
            assert!(ranges.windows(2).all(|w| w[1].start > w[0].end + 1));
        }
    }

    #[test]
    fn contains_checks_bounds() {
        let range = FailureRange { start: 5, end: 7 };
        assert!(range.contains(5));
        assert!(range.contains(7));
        assert!(!range.contains(8));
    }

    #[test]
    fn report_lists_one_token_per_line() {
        let report = format_failure_report(&ids(&[1, 2, 9])).unwrap();
        assert_eq!(report, "Failed IDs:\n000000001-000000002\n000000009");
    }
}
