use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob {0} already exists")]
    Conflict(String),

    #[error("blob store error: {0}")]
    Backend(String),
}

/// Binary asset storage with publicly resolvable URLs.
#[async_trait]
pub trait RemoteBlobStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError>;

    /// Resolve a blob path into a URL anyone can download from.
    fn public_url(&self, key: &str) -> String;
}
