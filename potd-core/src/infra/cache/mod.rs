//! Local durable asset cache.
//!
//! `asset_file_store` owns the on-disk layout (one file per day, written
//! atomically); `local_cache` decides which remote source fills it.

pub mod asset_file_store;
pub mod local_cache;

pub use asset_file_store::AssetFileStore;
pub use local_cache::{LocalCacheManager, MaterializedAsset};
