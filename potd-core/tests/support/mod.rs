#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use potd_core::{
    FixedClock, PictureService, PipelineDeps, PotdError, WalkPolicy,
    infra::{
        providers::apod_api_provider::classify_failure,
        stores::{MemoryBlobStore, MemoryRecordStore},
    },
    ports::{
        AssetFetcher, BlobError, ProviderError, ProviderRecord,
        RemoteBlobStore, RemoteRecordStore, SourceApiClient, StoreError,
    },
};
use potd_model::{DayRecord, MediaKind, NewDayRecord};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn provider_image(date: NaiveDate) -> ProviderRecord {
    ProviderRecord {
        date,
        title: format!("Nebula {date}"),
        explanation: "Gas and dust.".into(),
        url: format!("https://apod.example/image/{date}.jpg"),
        hdurl: Some(format!("https://apod.example/image/{date}_big.jpg")),
        media_type: "image".into(),
        copyright: Some("\nA. Astronomer\n".into()),
    }
}

pub fn provider_video(date: NaiveDate) -> ProviderRecord {
    ProviderRecord {
        date,
        title: "Launch".into(),
        explanation: "A launch.".into(),
        url: "https://www.youtube.com/embed/launch".into(),
        hdurl: None,
        media_type: "video".into(),
        copyright: None,
    }
}

pub fn stored_record(date: NaiveDate, kind: MediaKind) -> DayRecord {
    NewDayRecord {
        date,
        title: "Stored".into(),
        explanation: "Already in the store.".into(),
        primary_url: format!("https://apod.example/image/{date}.jpg"),
        high_def_url: Some(format!("https://apod.example/image/{date}_big.jpg")),
        media_kind: kind,
        attribution: None,
        blob_path: Some(format!("{date}_stored.jpg")),
        hd_blob_path: Some(format!("{date}_stored_hd.jpg")),
    }
    .into_record(Utc::now())
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Record(ProviderRecord),
    NoData,
    Fail(String),
    /// A raw non-success HTTP answer, classified the way the real client does.
    Status(u16, String),
}

/// Provider fake: per-date scripted answers, `NoData` for anything unscripted.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    answers: Mutex<HashMap<NaiveDate, Scripted>>,
    delays: Mutex<HashMap<NaiveDate, Duration>>,
    probes: Mutex<Vec<NaiveDate>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, date: NaiveDate, answer: Scripted) -> &Self {
        self.answers.lock().unwrap().insert(date, answer);
        self
    }

    pub fn delay(&self, date: NaiveDate, delay: Duration) -> &Self {
        self.delays.lock().unwrap().insert(date, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> Vec<NaiveDate> {
        self.probes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceApiClient for ScriptedSource {
    async fn fetch_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<ProviderRecord, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.probes.lock().unwrap().push(date);
        let delay = self.delays.lock().unwrap().get(&date).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let answer = self.answers.lock().unwrap().get(&date).cloned();
        match answer {
            Some(Scripted::Record(record)) => Ok(record),
            Some(Scripted::Fail(msg)) => Err(ProviderError::ApiError(msg)),
            Some(Scripted::Status(status, body)) => {
                Err(classify_failure(status, &body, date))
            }
            Some(Scripted::NoData) | None => Err(ProviderError::NoData(date)),
        }
    }
}

/// Record store that counts calls and can simulate a lost insert race.
#[derive(Debug, Default)]
pub struct CountingRecordStore {
    pub inner: MemoryRecordStore,
    gets: AtomicUsize,
    inserts: AtomicUsize,
    race_with: Mutex<Option<DayRecord>>,
}

impl CountingRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// The next insert loses to `winner`, which lands in the store first.
    pub fn lose_next_insert_to(&self, winner: DayRecord) {
        *self.race_with.lock().unwrap() = Some(winner);
    }
}

#[async_trait]
impl RemoteRecordStore for CountingRecordStore {
    async fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DayRecord>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_date(date).await
    }

    async fn insert(
        &self,
        record: NewDayRecord,
    ) -> Result<DayRecord, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let winner = self.race_with.lock().unwrap().take();
        if let Some(winner) = winner {
            self.inner.seed(winner);
        }
        self.inner.insert(record).await
    }
}

/// Blob store whose uploads always fail.
#[derive(Debug, Default)]
pub struct BrokenBlobStore;

#[async_trait]
impl RemoteBlobStore for BrokenBlobStore {
    async fn upload(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BlobError> {
        Err(BlobError::Backend(format!("bucket offline for {key}")))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://blobs.example/{key}")
    }
}

/// Downloader fake: serves scripted URLs, fails everything else, and keeps
/// the order URLs were requested in.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    requested: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: impl Into<String>, body: &[u8]) -> &Self {
        self.bodies.lock().unwrap().insert(url.into(), body.to_vec());
        self
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> potd_core::Result<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| PotdError::Transport(format!("connection refused: {url}")))
    }
}

/// A fully wired service over fakes.
pub struct Harness {
    pub records: Arc<CountingRecordStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub source: Arc<ScriptedSource>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub service: PictureService,
    pub today: NaiveDate,
}

impl Harness {
    pub fn new(cache_root: &Path, today: NaiveDate, policy: WalkPolicy) -> Self {
        let records = Arc::new(CountingRecordStore::new());
        let blobs = Arc::new(MemoryBlobStore::new("https://blobs.example"));
        let source = Arc::new(ScriptedSource::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        let service = PictureService::new(PipelineDeps {
            records: records.clone(),
            blobs: blobs.clone(),
            source: source.clone(),
            fetcher: fetcher.clone(),
            clock: Arc::new(FixedClock(today)),
            cache_root: cache_root.to_path_buf(),
            policy,
        });
        Self {
            records,
            blobs,
            source,
            fetcher,
            service,
            today,
        }
    }
}
