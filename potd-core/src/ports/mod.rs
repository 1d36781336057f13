//! Ports the pipeline depends on.
//!
//! Every external collaborator is a trait object handed in at construction
//! time, so the storage backend, the provider and the HTTP downloader can be
//! swapped for in-memory or scripted implementations.

pub mod assets;
pub mod blobs;
pub mod records;
pub mod source;

pub use assets::AssetFetcher;
pub use blobs::{BlobError, RemoteBlobStore};
pub use records::{RemoteRecordStore, StoreError};
pub use source::{ProviderError, ProviderRecord, SourceApiClient};
