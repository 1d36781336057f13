use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use potd_model::{DayRecord, NewDayRecord};

use crate::ports::{BlobError, RemoteBlobStore, RemoteRecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<NaiveDate, DayRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing insert semantics.
    pub fn seed(&self, record: DayRecord) {
        self.records.insert(record.date, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RemoteRecordStore for MemoryRecordStore {
    async fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DayRecord>, StoreError> {
        Ok(self.records.get(&date).map(|entry| entry.value().clone()))
    }

    async fn insert(
        &self,
        record: NewDayRecord,
    ) -> Result<DayRecord, StoreError> {
        match self.records.entry(record.date) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(record.date)),
            Entry::Vacant(slot) => {
                let stored = record.into_record(Utc::now());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug)]
pub struct MemoryBlobStore {
    public_base: String,
    blobs: DashMap<String, StoredBlob>,
}

impl MemoryBlobStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into(),
            blobs: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.blobs.get(key).map(|entry| entry.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> =
            self.blobs.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

#[async_trait]
impl RemoteBlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        match self.blobs.entry(key.to_string()) {
            Entry::Occupied(_) => Err(BlobError::Conflict(key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(StoredBlob {
                    bytes,
                    content_type: content_type.to_string(),
                });
                Ok(())
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potd_model::MediaKind;

    fn new_record(date: NaiveDate, title: &str) -> NewDayRecord {
        NewDayRecord {
            date,
            title: title.into(),
            explanation: String::new(),
            primary_url: "https://apod.example/a.jpg".into(),
            high_def_url: None,
            media_kind: MediaKind::Image,
            attribution: None,
            blob_path: None,
            hd_blob_path: None,
        }
    }

    #[tokio::test]
    async fn insert_is_write_once_per_date() {
        let store = MemoryRecordStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 10, 5).unwrap();

        store.insert(new_record(date, "first")).await.unwrap();
        let err = store.insert(new_record(date, "second")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(d) if d == date));

        let kept = store.get_by_date(date).await.unwrap().unwrap();
        assert_eq!(kept.title, "first");
    }

    #[tokio::test]
    async fn blob_upload_conflicts_on_existing_key() {
        let store = MemoryBlobStore::default();
        store.upload("a.jpg", vec![1], "image/jpeg").await.unwrap();
        assert!(matches!(
            store.upload("a.jpg", vec![2], "image/jpeg").await,
            Err(BlobError::Conflict(_))
        ));
        assert_eq!(store.get("a.jpg").unwrap().bytes, vec![1]);
        assert_eq!(store.public_url("a.jpg"), "memory://blobs/a.jpg");
    }
}
