use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use potd_core::{
    Clock, PictureService, PipelineDeps,
    infra::{
        http::HttpAssetFetcher,
        providers::ApodApiProvider,
        stores::{
            MemoryBlobStore, MemoryRecordStore, RestBlobStore,
            RestRecordStore, RestStoreSettings,
        },
    },
    ports::{RemoteBlobStore, RemoteRecordStore},
};

use crate::infra::config::Config;

/// Public base the in-memory blob store reports for stored keys.
pub const MEMORY_BLOB_BASE: &str = "memory://blobs";

/// Wire the concrete adapters named by `config` into a [`PictureService`].
pub fn build_picture_service(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<PictureService> {
    let timeout = config.http.request_timeout;

    let source = ApodApiProvider::new(
        config.provider.base_url.clone(),
        config.provider.api_key.clone(),
        timeout,
    )
    .context("failed to build provider client")?;
    let fetcher = HttpAssetFetcher::new(timeout)
        .context("failed to build asset downloader")?;

    let (records, blobs): (Arc<dyn RemoteRecordStore>, Arc<dyn RemoteBlobStore>) =
        match &config.store {
            Some(store) => {
                let settings = RestStoreSettings {
                    base_url: store.url.clone(),
                    api_key: store.api_key.clone(),
                    table: store.table.clone(),
                    bucket: store.bucket.clone(),
                    timeout,
                };
                info!(
                    url = %store.url,
                    table = %store.table,
                    bucket = %store.bucket,
                    "using REST record and blob stores"
                );
                (
                    Arc::new(
                        RestRecordStore::new(settings.clone())
                            .context("failed to build record store client")?,
                    ),
                    Arc::new(
                        RestBlobStore::new(settings)
                            .context("failed to build blob store client")?,
                    ),
                )
            }
            None => {
                info!("using in-memory record and blob stores");
                (
                    Arc::new(MemoryRecordStore::new()),
                    Arc::new(MemoryBlobStore::new(MEMORY_BLOB_BASE)),
                )
            }
        };

    info!(
        cache_root = %config.cache.root.display(),
        max_attempts = config.walk.max_attempts,
        horizon_days = config.walk.horizon_days,
        timeout = ?timeout,
        "pipeline configuration in effect"
    );

    Ok(PictureService::new(PipelineDeps {
        records,
        blobs,
        source: Arc::new(source),
        fetcher: Arc::new(fetcher),
        clock,
        cache_root: config.cache.root.clone(),
        policy: config.walk_policy(),
    }))
}
