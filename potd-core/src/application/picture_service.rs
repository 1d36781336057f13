use std::{fmt, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use potd_model::{DayRecord, PictureViewResponse};
use thiserror::Error;
use tracing::debug;

use super::{
    DateCursor, DayResolver, PreloadOrchestrator, PreloadTicket, Resolution,
    RetryWalkController, WalkError, WalkPolicy, WalkSuccess,
};
use crate::{
    clock::Clock,
    error::{PotdError, Result},
    infra::cache::{LocalCacheManager, MaterializedAsset},
    ports::{AssetFetcher, RemoteBlobStore, RemoteRecordStore, SourceApiClient},
};

/// Everything the pipeline needs from the outside world.
pub struct PipelineDeps {
    pub records: Arc<dyn RemoteRecordStore>,
    pub blobs: Arc<dyn RemoteBlobStore>,
    pub source: Arc<dyn SourceApiClient>,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub clock: Arc<dyn Clock>,
    pub cache_root: PathBuf,
    pub policy: WalkPolicy,
}

impl fmt::Debug for PipelineDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineDeps")
            .field("cache_root", &self.cache_root)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// A day ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureView {
    pub record: DayRecord,
    pub cached: bool,
    pub requested_date: NaiveDate,
    pub final_date: NaiveDate,
    pub attempts: u32,
    pub asset: MaterializedAsset,
}

impl From<PictureView> for PictureViewResponse {
    fn from(view: PictureView) -> Self {
        PictureViewResponse {
            data: view.record,
            cached: view.cached,
            requested_date: view.requested_date,
            final_date: view.final_date,
            attempts: view.attempts,
            asset: view.asset.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The record exists but its bytes could not be materialized.
    #[error(transparent)]
    Asset(PotdError),
}

/// Walk → materialize → preload, wired from explicit dependencies.
#[derive(Clone)]
pub struct PictureService {
    resolver: Arc<DayResolver>,
    walker: RetryWalkController,
    cache: LocalCacheManager,
    preload: PreloadOrchestrator,
}

impl fmt::Debug for PictureService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PictureService")
            .field("walker", &self.walker)
            .field("cache", &self.cache)
            .field("preload", &self.preload)
            .finish_non_exhaustive()
    }
}

impl PictureService {
    pub fn new(deps: PipelineDeps) -> Self {
        let PipelineDeps {
            records,
            blobs,
            source,
            fetcher,
            clock,
            cache_root,
            policy,
        } = deps;

        let resolver = Arc::new(DayResolver::new(
            records,
            Arc::clone(&blobs),
            source,
            Arc::clone(&fetcher),
        ));
        let cache = LocalCacheManager::new(cache_root, fetcher, blobs);
        let walker = RetryWalkController::new(
            Arc::clone(&resolver),
            policy,
            Arc::clone(&clock),
        );
        let preload = PreloadOrchestrator::new(
            Arc::clone(&resolver),
            cache.clone(),
            policy,
            clock,
        );

        Self {
            resolver,
            walker,
            cache,
            preload,
        }
    }

    pub fn resolver(&self) -> &DayResolver {
        &self.resolver
    }

    pub fn walker(&self) -> &RetryWalkController {
        &self.walker
    }

    pub fn cache(&self) -> &LocalCacheManager {
        &self.cache
    }

    pub fn preloader(&self) -> &PreloadOrchestrator {
        &self.preload
    }

    /// Single resolution of a wire date, no walking.
    pub async fn resolve(&self, raw_date: &str) -> Result<Resolution> {
        self.resolver.resolve_key(raw_date).await
    }

    pub async fn view(
        &self,
        requested: NaiveDate,
    ) -> std::result::Result<PictureView, ViewError> {
        let (view, _detached) = self.view_tracked(requested).await;
        view
    }

    /// Like [`PictureService::view`] but also hands back the preload tasks.
    pub async fn view_tracked(
        &self,
        requested: NaiveDate,
    ) -> (std::result::Result<PictureView, ViewError>, PreloadTicket) {
        match self.walker.walk(requested).await {
            Ok(success) => self.finish(success).await,
            Err(err) => (Err(err.into()), PreloadTicket::default()),
        }
    }

    /// Full pipeline for a UI navigation: the cursor follows the walk.
    pub async fn view_and_commit(
        &self,
        cursor: &DateCursor,
        requested: NaiveDate,
    ) -> std::result::Result<PictureView, ViewError> {
        let success = self.walker.walk_and_commit(cursor, requested).await?;
        let (view, _detached) = self.finish(success).await;
        view
    }

    async fn finish(
        &self,
        success: WalkSuccess,
    ) -> (std::result::Result<PictureView, ViewError>, PreloadTicket) {
        // Neighbors start as soon as the primary day is known and run
        // alongside its materialization.
        let ticket = self.preload.preload_neighbors(success.final_date);
        debug!(date = %success.final_date, neighbors = ?ticket.dates(), "preload scheduled");

        let view = match self.cache.materialize(&success.record).await {
            Ok(asset) => Ok(PictureView {
                record: success.record,
                cached: success.cached,
                requested_date: success.requested_date,
                final_date: success.final_date,
                attempts: success.attempts,
                asset,
            }),
            Err(err) => Err(ViewError::Asset(err)),
        };
        (view, ticket)
    }
}
