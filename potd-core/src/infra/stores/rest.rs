use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use potd_model::{DayRecord, MediaKind, NewDayRecord, day_key};
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::Result,
    infra::http::build_http_client,
    ports::{BlobError, RemoteBlobStore, RemoteRecordStore, StoreError},
};

/// Connection settings shared by the record and blob adapters.
#[derive(Clone)]
pub struct RestStoreSettings {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub bucket: String,
    pub timeout: Duration,
}

impl fmt::Debug for RestStoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStoreSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("bucket", &self.bucket)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RestStoreSettings {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }
}

/// Row layout of the records table.
#[derive(Debug, Serialize, Deserialize)]
struct RecordRow {
    date: NaiveDate,
    title: String,
    #[serde(default)]
    explanation: String,
    url: String,
    #[serde(default)]
    hdurl: Option<String>,
    media_type: MediaKind,
    #[serde(default)]
    copyright: Option<String>,
    #[serde(default)]
    blob_path: Option<String>,
    #[serde(default)]
    hd_blob_path: Option<String>,
    #[serde(default, skip_serializing)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<NewDayRecord> for RecordRow {
    fn from(record: NewDayRecord) -> Self {
        Self {
            date: record.date,
            title: record.title,
            explanation: record.explanation,
            url: record.primary_url,
            hdurl: record.high_def_url,
            media_type: record.media_kind,
            copyright: record.attribution,
            blob_path: record.blob_path,
            hd_blob_path: record.hd_blob_path,
            created_at: None,
            updated_at: None,
        }
    }
}

impl RecordRow {
    fn into_record(self) -> DayRecord {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        DayRecord {
            date: self.date,
            title: self.title,
            explanation: self.explanation,
            primary_url: self.url,
            high_def_url: self.hdurl,
            media_kind: self.media_type,
            attribution: self.copyright,
            blob_path: self.blob_path,
            hd_blob_path: self.hd_blob_path,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// Records table exposed through PostgREST.
pub struct RestRecordStore {
    http: reqwest::Client,
    settings: RestStoreSettings,
}

impl fmt::Debug for RestRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestRecordStore")
            .field("settings", &self.settings)
            .finish()
    }
}

impl RestRecordStore {
    pub fn new(settings: RestStoreSettings) -> Result<Self> {
        Ok(Self {
            http: build_http_client(settings.timeout)?,
            settings,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.settings.base(), self.settings.table)
    }
}

#[async_trait]
impl RemoteRecordStore for RestRecordStore {
    async fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> std::result::Result<Option<DayRecord>, StoreError> {
        let filter = format!("eq.{}", day_key(date));
        let response = self
            .settings
            .authorize(self.http.get(self.table_url()))
            .query(&[("date", filter.as_str()), ("select", "*")])
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "lookup failed with status {status}: {body}"
            )));
        }

        let rows: Vec<RecordRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(rows.into_iter().next().map(RecordRow::into_record))
    }

    async fn insert(
        &self,
        record: NewDayRecord,
    ) -> std::result::Result<DayRecord, StoreError> {
        let date = record.date;
        let row = RecordRow::from(record);
        let response = self
            .settings
            .authorize(self.http.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(StoreError::UniqueViolation(date));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // PostgREST surfaces unique violations as SQLSTATE 23505.
            if body.contains("23505") {
                return Err(StoreError::UniqueViolation(date));
            }
            return Err(StoreError::Backend(format!(
                "insert failed with status {status}: {body}"
            )));
        }

        let mut rows: Vec<RecordRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.pop()
            .map(RecordRow::into_record)
            .ok_or_else(|| StoreError::Backend("insert returned no row".into()))
    }
}

/// Object-storage bucket with public read URLs.
pub struct RestBlobStore {
    http: reqwest::Client,
    settings: RestStoreSettings,
}

impl fmt::Debug for RestBlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestBlobStore")
            .field("settings", &self.settings)
            .finish()
    }
}

impl RestBlobStore {
    pub fn new(settings: RestStoreSettings) -> Result<Self> {
        Ok(Self {
            http: build_http_client(settings.timeout)?,
            settings,
        })
    }
}

#[async_trait]
impl RemoteBlobStore for RestBlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<(), BlobError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.settings.base(),
            self.settings.bucket,
            key
        );
        debug!(key, content_type, len = bytes.len(), "uploading blob");

        let response = self
            .settings
            .authorize(self.http.post(&url))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || body.contains("Duplicate") {
            return Err(BlobError::Conflict(key.to_string()));
        }
        Err(BlobError::Backend(format!(
            "upload failed with status {status}: {body}"
        )))
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.settings.base(),
            self.settings.bucket,
            key
        )
    }
}
