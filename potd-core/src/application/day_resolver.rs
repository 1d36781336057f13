use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use potd_model::{DayRecord, MediaKind, NewDayRecord, parse_day_key};
use tracing::{debug, info, warn};

use super::blob_naming::{BlobVariant, blob_key, content_type_for, extension_from_url};
use crate::{
    error::{PotdError, Result},
    ports::{
        AssetFetcher, BlobError, ProviderError, ProviderRecord,
        RemoteBlobStore, RemoteRecordStore, SourceApiClient, StoreError,
    },
};

/// A resolved day and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub record: DayRecord,
    /// True when the record store already had the day.
    pub cached: bool,
}

/// Get-or-create for one day's record.
#[derive(Clone)]
pub struct DayResolver {
    records: Arc<dyn RemoteRecordStore>,
    blobs: Arc<dyn RemoteBlobStore>,
    source: Arc<dyn SourceApiClient>,
    fetcher: Arc<dyn AssetFetcher>,
}

impl fmt::Debug for DayResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DayResolver").finish_non_exhaustive()
    }
}

impl DayResolver {
    pub fn new(
        records: Arc<dyn RemoteRecordStore>,
        blobs: Arc<dyn RemoteBlobStore>,
        source: Arc<dyn SourceApiClient>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        Self {
            records,
            blobs,
            source,
            fetcher,
        }
    }

    /// Resolve a wire date. Malformed input fails before any store or
    /// provider call is made.
    pub async fn resolve_key(&self, raw: &str) -> Result<Resolution> {
        let date = parse_day_key(raw)?;
        self.resolve(date).await
    }

    pub async fn resolve(&self, date: NaiveDate) -> Result<Resolution> {
        if let Some(record) = self.lookup(date).await? {
            info!(%date, cached = true, "resolved day");
            return Ok(Resolution {
                record,
                cached: true,
            });
        }

        let fetched = self.source.fetch_by_date(date).await.map_err(|err| {
            match err {
                ProviderError::NoData(_) => PotdError::NoDataForDate(date),
                other => PotdError::Transport(other.to_string()),
            }
        })?;
        if fetched.date != date {
            warn!(
                %date,
                provider_date = %fetched.date,
                "provider answered for a different day; keeping requested key"
            );
        }

        let media_kind = MediaKind::from_provider(&fetched.media_type)
            .map_err(|e| PotdError::Transport(e.to_string()))?;

        let (blob_path, hd_blob_path) = if media_kind == MediaKind::Image {
            self.persist_blobs(date, &fetched).await
        } else {
            (None, None)
        };

        let primary_url = primary_url_of(&fetched);
        if primary_url.is_empty() {
            warn!(%date, media_type = %fetched.media_type, "provider returned no media URL");
        }

        let new_record = NewDayRecord {
            date,
            title: fetched.title.trim().to_string(),
            explanation: fetched.explanation.trim().to_string(),
            primary_url,
            high_def_url: fetched.hdurl.filter(|u| !u.trim().is_empty()),
            media_kind,
            attribution: fetched
                .copyright
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            blob_path,
            hd_blob_path,
        };

        match self.records.insert(new_record).await {
            Ok(record) => {
                info!(%date, cached = false, "resolved day");
                Ok(Resolution {
                    record,
                    cached: false,
                })
            }
            Err(StoreError::UniqueViolation(_)) => {
                // Another flow inserted the same day first; theirs is canonical.
                debug!(%date, "insert raced with another writer, re-reading");
                let record = self.lookup(date).await?.ok_or_else(|| {
                    PotdError::Transport(format!(
                        "record for {date} conflicted on insert but could not be re-read"
                    ))
                })?;
                Ok(Resolution {
                    record,
                    cached: true,
                })
            }
            Err(StoreError::Backend(msg)) => Err(PotdError::Transport(msg)),
        }
    }

    async fn lookup(&self, date: NaiveDate) -> Result<Option<DayRecord>> {
        self.records
            .get_by_date(date)
            .await
            .map_err(|e| PotdError::Transport(e.to_string()))
    }

    /// Copy the image bytes into the blob store. Never fails the resolution.
    async fn persist_blobs(
        &self,
        date: NaiveDate,
        fetched: &ProviderRecord,
    ) -> (Option<String>, Option<String>) {
        let standard = if fetched.url.trim().is_empty() {
            None
        } else {
            self.persist_blob(date, &fetched.title, &fetched.url, BlobVariant::Standard)
                .await
        };
        let high_def = match fetched.hdurl.as_deref() {
            Some(hd) if !hd.trim().is_empty() => {
                self.persist_blob(date, &fetched.title, hd, BlobVariant::HighDef)
                    .await
            }
            _ => None,
        };
        (standard, high_def)
    }

    async fn persist_blob(
        &self,
        date: NaiveDate,
        title: &str,
        url: &str,
        variant: BlobVariant,
    ) -> Option<String> {
        let key = blob_key(date, title, url, variant);
        match self.upload_from(url, &key).await {
            Ok(()) => Some(key),
            Err(err) => {
                warn!(%date, key = %key, "{err}; record will be stored without this blob");
                None
            }
        }
    }

    async fn upload_from(&self, url: &str, key: &str) -> Result<()> {
        let upload_err = |message: String| PotdError::BlobUpload {
            key: key.to_string(),
            message,
        };

        let bytes = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| upload_err(format!("download from {url} failed: {e}")))?;
        let content_type = content_type_for(&extension_from_url(url));

        match self.blobs.upload(key, bytes, content_type).await {
            Ok(()) => Ok(()),
            Err(BlobError::Conflict(_)) => {
                debug!(key, "blob already present, reusing it");
                Ok(())
            }
            Err(BlobError::Backend(msg)) => Err(upload_err(msg)),
        }
    }
}

/// The standard URL, or the HD one when the provider left `url` out.
fn primary_url_of(fetched: &ProviderRecord) -> String {
    let url = fetched.url.trim();
    if !url.is_empty() {
        return url.to_string();
    }
    fetched
        .hdurl
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}
