use async_trait::async_trait;

use crate::error::Result;

/// Downloads raw asset bytes from a URL.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
