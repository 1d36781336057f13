use std::{fmt, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use potd_model::{AssetView, DayRecord, MediaKind};
use tracing::{debug, info, warn};

use super::AssetFileStore;
use crate::{
    error::{PotdError, Result},
    ports::{AssetFetcher, RemoteBlobStore},
};

/// Where a day's asset ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializedAsset {
    /// Bytes live on local storage. `downloaded` is false on a cache hit.
    Local { path: PathBuf, downloaded: bool },
    /// Streamable content handed back verbatim; never cached locally.
    Remote { url: String },
}

impl From<MaterializedAsset> for AssetView {
    fn from(asset: MaterializedAsset) -> Self {
        match asset {
            MaterializedAsset::Local { path, downloaded } => {
                AssetView::Local { path, downloaded }
            }
            MaterializedAsset::Remote { url } => AssetView::Remote { url },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    HighDef,
    Standard,
    BlobHighDef,
    Blob,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceOrigin::HighDef => "hd",
            SourceOrigin::Standard => "standard",
            SourceOrigin::BlobHighDef => "blob-hd",
            SourceOrigin::Blob => "blob",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSource {
    pub origin: SourceOrigin,
    pub url: String,
}

/// Materializes a record's primary asset onto local storage.
///
/// Entries are never evicted; [`LocalCacheManager::clear`] is the only way
/// files leave the cache.
#[derive(Clone)]
pub struct LocalCacheManager {
    files: AssetFileStore,
    fetcher: Arc<dyn AssetFetcher>,
    blobs: Arc<dyn RemoteBlobStore>,
}

impl fmt::Debug for LocalCacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCacheManager")
            .field("root", &self.files.root())
            .finish_non_exhaustive()
    }
}

impl LocalCacheManager {
    pub fn new(
        root: PathBuf,
        fetcher: Arc<dyn AssetFetcher>,
        blobs: Arc<dyn RemoteBlobStore>,
    ) -> Self {
        Self {
            files: AssetFileStore::new(root),
            fetcher,
            blobs,
        }
    }

    pub fn files(&self) -> &AssetFileStore {
        &self.files
    }

    pub async fn materialize(
        &self,
        record: &DayRecord,
    ) -> Result<MaterializedAsset> {
        if record.media_kind == MediaKind::Video {
            if record.primary_url.trim().is_empty() {
                return Err(PotdError::AssetUnavailable {
                    date: record.date,
                    attempted: 0,
                });
            }
            debug!(date = %record.date, "video content is streamed, not cached");
            return Ok(MaterializedAsset::Remote {
                url: record.primary_url.clone(),
            });
        }

        let path = self.files.path_for(record.date);
        if self.files.exists(record.date).await {
            debug!(date = %record.date, path = %path.display(), "asset cache hit");
            return Ok(MaterializedAsset::Local {
                path,
                downloaded: false,
            });
        }

        let sources = self.download_sources(record);
        for source in &sources {
            match self.fetcher.fetch(&source.url).await {
                Ok(bytes) => {
                    let path =
                        self.files.write_if_missing(record.date, &bytes).await?;
                    info!(
                        date = %record.date,
                        origin = %source.origin,
                        bytes = bytes.len(),
                        path = %path.display(),
                        "asset cached"
                    );
                    return Ok(MaterializedAsset::Local {
                        path,
                        downloaded: true,
                    });
                }
                Err(err) => {
                    warn!(
                        date = %record.date,
                        origin = %source.origin,
                        url = %source.url,
                        "asset download failed, trying next source: {err}"
                    );
                }
            }
        }

        Err(PotdError::AssetUnavailable {
            date: record.date,
            attempted: sources.len(),
        })
    }

    /// Download candidates in strict priority order, without repeats.
    pub fn download_sources(&self, record: &DayRecord) -> Vec<DownloadSource> {
        let candidates = [
            (SourceOrigin::HighDef, record.high_def_url.clone()),
            (SourceOrigin::Standard, Some(record.primary_url.clone())),
            (
                SourceOrigin::BlobHighDef,
                record.hd_blob_path.as_deref().map(|p| self.blobs.public_url(p)),
            ),
            (
                SourceOrigin::Blob,
                record.blob_path.as_deref().map(|p| self.blobs.public_url(p)),
            ),
        ];

        let mut sources: Vec<DownloadSource> = Vec::with_capacity(4);
        for (origin, url) in candidates {
            let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
                continue;
            };
            if sources.iter().any(|s| s.url == url) {
                continue;
            }
            sources.push(DownloadSource { origin, url });
        }
        sources
    }

    pub fn local_path(&self, date: NaiveDate) -> PathBuf {
        self.files.path_for(date)
    }

    pub async fn cached_dates(&self) -> Result<Vec<NaiveDate>> {
        self.files.list_dates().await
    }

    /// Explicit full clear; the only deletion path for cached assets.
    pub async fn clear(&self) -> Result<usize> {
        let removed = self.files.list_dates().await?.len();
        self.files.clear().await?;
        info!(removed, root = %self.files.root().display(), "local asset cache cleared");
        Ok(removed)
    }
}
