//! Batch orchestration: fetch and convert every identifier of a request
//!
//! Items run through a bounded, order-preserving stream. Each item yields exactly one
//! [`ItemOutcome`]; a failed fetch or conversion is recorded and never stops its
//! siblings.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::convert::Converter;
use crate::error::{ConvertError, Error, Result};
use crate::fetch::ItemFetcher;
use crate::types::{BatchResult, ItemId, ItemOutcome, RangeRequest};

/// Drives fetch and conversion for each identifier of a request
#[derive(Clone)]
pub struct BatchOrchestrator {
    fetcher: Arc<dyn ItemFetcher>,
    converter: Arc<dyn Converter>,
    concurrency: usize,
    max_items: usize,
}

impl BatchOrchestrator {
    /// Create an orchestrator using the concurrency and size limits from `config`
    pub fn new(
        fetcher: Arc<dyn ItemFetcher>,
        converter: Arc<dyn Converter>,
        config: &BatchConfig,
    ) -> Self {
        Self {
            fetcher,
            converter,
            concurrency: config.concurrency.max(1),
            max_items: config.max_items(),
        }
    }

    /// The converter items are run through
    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.converter
    }

    /// Process every identifier of `request`
    ///
    /// Outcomes are returned in ascending identifier order regardless of completion
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolMissing`] before any fetch if the converter reports that
    /// its tool is unavailable. Per-item failures are never errors.
    pub async fn run(&self, request: &RangeRequest) -> Result<BatchResult> {
        match self.converter.check_available() {
            Ok(()) => {}
            Err(ConvertError::ToolMissing { path }) => {
                return Err(Error::ToolMissing { path });
            }
            Err(e) => {
                warn!(
                    converter = self.converter.name(),
                    error = %e,
                    "converter availability check failed"
                );
            }
        }

        let mut ids = request.expand();
        if ids.len() > self.max_items {
            warn!(
                token = request.token(),
                requested = ids.len(),
                max = self.max_items,
                "request exceeds batch limit, truncating"
            );
            ids.truncate(self.max_items);
        }

        let total = ids.len();
        debug!(
            token = request.token(),
            total,
            concurrency = self.concurrency,
            "starting batch"
        );

        let outcomes: Vec<ItemOutcome> = stream::iter(ids)
            .map(|id| self.process_item(id))
            .buffered(self.concurrency)
            .collect()
            .await;

        let result = BatchResult::new(request, outcomes);
        info!(
            token = request.token(),
            total,
            succeeded = result.success_count(),
            failed = total - result.success_count(),
            "batch finished"
        );
        Ok(result)
    }

    /// Fetch, then convert only if the fetch succeeded
    async fn process_item(&self, id: ItemId) -> ItemOutcome {
        let blob = match self.fetcher.fetch(&id).await {
            Ok(blob) => blob,
            Err(error) => {
                warn!(item_id = %id, error = %error, "fetch failed");
                return ItemOutcome::FetchFailed { id, error };
            }
        };

        match self.converter.convert(&blob).await {
            Ok(bytes) => {
                debug!(item_id = %id, size = bytes.len(), "item converted");
                ItemOutcome::Success { id, bytes }
            }
            Err(error) => {
                warn!(item_id = %id, error = %error, "conversion failed");
                ItemOutcome::ConvertFailed { id, error }
            }
        }
    }
}
