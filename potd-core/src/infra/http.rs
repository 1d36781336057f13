use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::{PotdError, Result},
    ports::AssetFetcher,
};

const USER_AGENT: &str =
    concat!("potd/", env!("CARGO_PKG_VERSION"), " (+picture-of-the-day cache)");

/// Shared client construction: every outbound call gets an explicit timeout so
/// one stalled probe cannot hold a walk indefinitely.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| {
            PotdError::Internal(format!("Failed to create HTTP client: {e}"))
        })
}

/// Plain HTTP downloader for asset bytes.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    http_client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
        })
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "downloading asset");
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(PotdError::HttpStatus {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let expected_len = response.content_length();
        let bytes = response.bytes().await?;

        if let Some(content_len) = expected_len
            && bytes.len() as u64 != content_len
        {
            return Err(PotdError::Transport(format!(
                "asset size mismatch for {url}: got {} bytes, expected {content_len}",
                bytes.len()
            )));
        }

        if bytes.is_empty() {
            return Err(PotdError::Transport(format!(
                "asset at {url} was empty"
            )));
        }

        Ok(bytes.to_vec())
    }
}
