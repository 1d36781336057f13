use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use potd_model::{day_key, parse_day_key};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{PotdError, Result};

const ENTRY_EXTENSION: &str = "img";

/// File-backed, immutable per-day assets.
///
/// The file at [`AssetFileStore::path_for`] *is* the cache entry; there is no
/// separate index to keep in sync.
#[derive(Clone, Debug)]
pub struct AssetFileStore {
    root: PathBuf,
}

impl AssetFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic local path for a day.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(format!("{}.{ENTRY_EXTENSION}", day_key(date)))
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            PotdError::Internal(format!(
                "failed to create asset cache dir {:?}: {err}",
                self.root
            ))
        })
    }

    pub async fn exists(&self, date: NaiveDate) -> bool {
        tokio::fs::try_exists(self.path_for(date))
            .await
            .unwrap_or(false)
    }

    /// Best-effort atomic write (tmp + rename). If the entry already exists,
    /// this is a no-op and the existing path is returned.
    pub async fn write_if_missing(
        &self,
        date: NaiveDate,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        self.ensure_root().await?;
        let path = self.path_for(date);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }

        let tmp = self.root.join(format!(
            "{}.tmp-{}",
            day_key(date),
            Uuid::new_v4().simple()
        ));

        let mut file = tokio::fs::File::create(&tmp).await.map_err(|err| {
            PotdError::Internal(format!(
                "failed to create temp asset {:?}: {err}",
                tmp
            ))
        })?;
        if let Err(err) = file.write_all(bytes).await {
            drop(file);
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PotdError::Internal(format!(
                "failed to write temp asset {:?}: {err}",
                tmp
            )));
        }
        if let Err(err) = file.flush().await {
            drop(file);
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PotdError::Internal(format!(
                "failed to flush temp asset {:?}: {err}",
                tmp
            )));
        }
        drop(file);

        // If another writer won the race, discard our temp.
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Ok(path);
        }

        tokio::fs::rename(&tmp, &path).await.map_err(|err| {
            PotdError::Internal(format!(
                "failed to move asset {:?} -> {:?}: {err}",
                tmp, path
            ))
        })?;

        Ok(path)
    }

    /// Days with a complete entry on disk, oldest first. Stray temp files
    /// and foreign files are ignored.
    pub async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut dates = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(&format!(".{ENTRY_EXTENSION}"))
            else {
                continue;
            };
            if let Ok(date) = parse_day_key(stem) {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }

    /// Remove every entry and recreate an empty root.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        self.ensure_root().await
    }
}
