#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::NaiveDate;
use potd_core::{
    FixedClock, PictureService, PipelineDeps, PotdError,
    infra::stores::{MemoryBlobStore, MemoryRecordStore},
    ports::{AssetFetcher, ProviderError, ProviderRecord, SourceApiClient},
};
use potd_server::{
    AppState, create_app,
    infra::config::{ConfigLoader, EnvConfig},
};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Provider fake: scripted images per date, nothing published otherwise.
#[derive(Debug, Default)]
pub struct FakeSource {
    published: Mutex<HashMap<NaiveDate, ProviderRecord>>,
}

impl FakeSource {
    pub fn publish(&self, date: NaiveDate) {
        self.published.lock().unwrap().insert(
            date,
            ProviderRecord {
                date,
                title: format!("Galaxy {date}"),
                explanation: "Stars.".into(),
                url: image_url(date),
                hdurl: None,
                media_type: "image".into(),
                copyright: None,
            },
        );
    }
}

#[async_trait]
impl SourceApiClient for FakeSource {
    async fn fetch_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<ProviderRecord, ProviderError> {
        self.published
            .lock()
            .unwrap()
            .get(&date)
            .cloned()
            .ok_or(ProviderError::NoData(date))
    }
}

pub fn image_url(date: NaiveDate) -> String {
    format!("https://apod.example/image/{date}.jpg")
}

/// Serves a small body for every provider image URL.
#[derive(Debug, Default)]
pub struct FakeFetcher;

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> potd_core::Result<Vec<u8>> {
        if url.starts_with("https://apod.example/") {
            Ok(format!("bytes of {url}").into_bytes())
        } else {
            Err(PotdError::Transport(format!("unreachable: {url}")))
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub source: Arc<FakeSource>,
    pub records: Arc<MemoryRecordStore>,
    pub today: NaiveDate,
}

/// Router over in-memory stores, with "today" pinned to 2024-10-05.
pub fn build_test_app(cache_root: &Path) -> TestApp {
    let config_path = cache_root.join("potd.toml");
    std::fs::write(
        &config_path,
        format!(
            "[cache]\nroot = {:?}\n\n[walk]\nmax_attempts = 20\nhorizon_days = 50\n",
            cache_root.join("pictures")
        ),
    )
    .unwrap();
    let config = ConfigLoader::new()
        .with_config_path(&config_path)
        .load_with_env(EnvConfig::default())
        .unwrap()
        .config;

    let today = day(2024, 10, 5);
    let source = Arc::new(FakeSource::default());
    let records = Arc::new(MemoryRecordStore::new());
    let service = PictureService::new(PipelineDeps {
        records: records.clone(),
        blobs: Arc::new(MemoryBlobStore::new("https://blobs.example")),
        source: source.clone(),
        fetcher: Arc::new(FakeFetcher),
        clock: Arc::new(FixedClock(today)),
        cache_root: config.cache.root.clone(),
        policy: config.walk_policy(),
    });

    let server = TestServer::new(create_app(AppState::new(service, config)))
        .unwrap();
    TestApp {
        server,
        source,
        records,
        today,
    }
}
