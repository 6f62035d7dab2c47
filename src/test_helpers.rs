//! Shared in-memory collaborators for pipeline tests.

use crate::convert::Converter;
use crate::error::{ConvertError, FetchError};
use crate::fetch::ItemFetcher;
use crate::types::ItemId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fetcher serving blobs from a map. Unknown identifiers answer 404.
#[derive(Default)]
pub(crate) struct MockFetcher {
    responses: HashMap<String, Result<Vec<u8>, FetchError>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_blob(mut self, id: &str, blob: &[u8]) -> Self {
        self.responses.insert(id.to_string(), Ok(blob.to_vec()));
        self
    }

    pub(crate) fn with_error(mut self, id: &str, error: FetchError) -> Self {
        self.responses.insert(id.to_string(), Err(error));
        self
    }

    pub(crate) fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemFetcher for MockFetcher {
    async fn fetch(&self, id: &ItemId) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(id.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(id.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        let result = self
            .responses
            .get(id.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Status { status: 404 }));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Converter that prefixes blobs with `png:`.
///
/// Blobs starting with `fail` exit with an error, blobs starting with `slow` hang
/// until the converter's timeout expires.
pub(crate) struct MockConverter {
    timeout: Duration,
    available: bool,
    calls: AtomicUsize,
}

impl MockConverter {
    pub(crate) fn new() -> Self {
        Self {
            timeout: Duration::from_millis(200),
            available: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Converter for MockConverter {
    async fn convert(&self, blob: &[u8]) -> Result<Vec<u8>, ConvertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if blob.starts_with(b"fail") {
            return Err(ConvertError::ToolError {
                exit_code: Some(1),
                stderr: "ERROR: corrupt block".into(),
            });
        }
        if blob.starts_with(b"slow") {
            let hang = tokio::time::sleep(Duration::from_secs(30));
            if tokio::time::timeout(self.timeout, hang).await.is_err() {
                return Err(ConvertError::Timeout {
                    after: self.timeout,
                });
            }
        }
        let mut image = b"png:".to_vec();
        image.extend_from_slice(blob);
        Ok(image)
    }

    fn check_available(&self) -> Result<(), ConvertError> {
        if self.available {
            Ok(())
        } else {
            Err(ConvertError::ToolMissing {
                path: "astcenc".into(),
            })
        }
    }

    fn output_extension(&self) -> &str {
        "png"
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
