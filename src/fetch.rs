//! Blob download from the remote texture store

use crate::error::{FetchError, Result};
use crate::types::ItemId;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Suffix appended to an identifier to form the blob file name
pub const BLOB_SUFFIX: &str = "_rgb.astc";

/// Retrieves the raw blob for one identifier
///
/// Implementations make a single attempt per call. A failure is returned as data and
/// must not affect other calls.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Download the blob for `id`
    async fn fetch(&self, id: &ItemId) -> std::result::Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher: `GET {base_url}{id}_rgb.astc`
#[derive(Clone, Debug)]
pub struct HttpItemFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpItemFetcher {
    /// Create a fetcher with its own client and per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a fetcher sharing an existing client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Full URL of the blob for `id`
    pub fn url_for(&self, id: &ItemId) -> String {
        format!("{}{}{}", self.base_url, id, BLOB_SUFFIX)
    }
}

#[async_trait]
impl ItemFetcher for HttpItemFetcher {
    async fn fetch(&self, id: &ItemId) -> std::result::Result<Vec<u8>, FetchError> {
        let url = self.url_for(id);
        debug!(item_id = %id, url = %url, "fetching blob");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        debug!(item_id = %id, size = bytes.len(), "fetched blob");
        Ok(bytes.to_vec())
    }
}
