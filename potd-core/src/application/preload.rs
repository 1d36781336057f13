use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{DayResolver, WalkPolicy};
use crate::{clock::Clock, error::PotdError, infra::cache::LocalCacheManager};

/// Handles of the neighbor tasks spawned by one preload call.
///
/// Dropping the ticket detaches the tasks; awaiting [`PreloadTicket::join`]
/// waits for them (tests use this to observe side effects).
#[derive(Debug, Default)]
pub struct PreloadTicket {
    dates: Vec<NaiveDate>,
    handles: Vec<JoinHandle<()>>,
}

impl PreloadTicket {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub async fn join(self) {
        for result in join_all(self.handles).await {
            if let Err(err) = result {
                warn!("[preload] neighbor task aborted: {err}");
            }
        }
    }
}

/// Warms the record store and the local cache for the days either side of
/// the one being viewed.
#[derive(Clone)]
pub struct PreloadOrchestrator {
    resolver: Arc<DayResolver>,
    cache: LocalCacheManager,
    policy: WalkPolicy,
    clock: Arc<dyn Clock>,
    in_flight: Arc<Mutex<HashSet<NaiveDate>>>,
}

impl fmt::Debug for PreloadOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = self
            .in_flight
            .lock()
            .map(|guard| guard.len())
            .unwrap_or(0);
        f.debug_struct("PreloadOrchestrator")
            .field("policy", &self.policy)
            .field("in_flight", &in_flight)
            .finish_non_exhaustive()
    }
}

/// Releases a date's in-flight slot even if the task unwinds.
struct InFlightGuard {
    date: NaiveDate,
    in_flight: Arc<Mutex<HashSet<NaiveDate>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.date);
        }
    }
}

impl PreloadOrchestrator {
    pub fn new(
        resolver: Arc<DayResolver>,
        cache: LocalCacheManager,
        policy: WalkPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            cache,
            policy,
            clock,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Neighbors of `date` that fall inside `[oldest allowed, today]`.
    pub fn neighbors(&self, date: NaiveDate) -> Vec<NaiveDate> {
        let today = self.clock.today();
        let oldest = self.policy.oldest_allowed(today);
        [date.pred_opt(), date.succ_opt()]
            .into_iter()
            .flatten()
            .filter(|d| *d >= oldest && *d <= today)
            .collect()
    }

    /// Spawn detached, single-attempt resolve + cache tasks for the previous
    /// and next day. Never blocks and never reports failure to the caller.
    pub fn preload_neighbors(&self, date: NaiveDate) -> PreloadTicket {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("[preload] skipped (no Tokio runtime available)");
            return PreloadTicket::default();
        }

        let mut ticket = PreloadTicket::default();
        for neighbor in self.neighbors(date) {
            let Some(guard) = self.try_begin(neighbor) else {
                debug!(date = %neighbor, "[preload] already in flight");
                continue;
            };
            let this = self.clone();
            ticket.dates.push(neighbor);
            ticket.handles.push(tokio::spawn(async move {
                let _guard = guard;
                this.preload_one(neighbor).await;
            }));
        }
        ticket
    }

    fn try_begin(&self, date: NaiveDate) -> Option<InFlightGuard> {
        let mut set = self.in_flight.lock().ok()?;
        if !set.insert(date) {
            return None;
        }
        Some(InFlightGuard {
            date,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    async fn preload_one(&self, date: NaiveDate) {
        let resolution = match self.resolver.resolve(date).await {
            Ok(resolution) => resolution,
            Err(PotdError::NoDataForDate(_)) => {
                debug!(%date, "[preload] nothing published");
                return;
            }
            Err(err) => {
                warn!(%date, "[preload] resolve failed: {err}");
                return;
            }
        };

        match self.cache.materialize(&resolution.record).await {
            Ok(asset) => debug!(%date, ?asset, "[preload] neighbor ready"),
            Err(err) => warn!(%date, "[preload] caching failed: {err}"),
        }
    }
}
