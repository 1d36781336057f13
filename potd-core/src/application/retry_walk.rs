use std::{fmt, sync::Arc};

use chrono::{Days, NaiveDate};
use potd_model::DayRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{DateCursor, DayResolver, Resolution};
use crate::{clock::Clock, error::PotdError};

/// Walk steps allowed after the first probe.
///
/// Older notes disagree between 10 and 20; 20 is the value the shipped
/// behavior used and is the single source of truth here.
pub const DEFAULT_MAX_WALK_ATTEMPTS: u32 = 20;

/// How far behind today a walk may probe.
pub const DEFAULT_WALK_HORIZON_DAYS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkPolicy {
    pub max_attempts: u32,
    pub horizon_days: u32,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_WALK_ATTEMPTS,
            horizon_days: DEFAULT_WALK_HORIZON_DAYS,
        }
    }
}

impl WalkPolicy {
    pub fn oldest_allowed(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.horizon_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    MaxAttemptsReached,
    OldestDateReached,
}

impl ExhaustReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            ExhaustReason::MaxAttemptsReached => {
                "No picture found after checking several earlier days. Please try again later."
            }
            ExhaustReason::OldestDateReached => {
                "No picture is available this far back. Please pick a more recent day."
            }
        }
    }
}

impl fmt::Display for ExhaustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExhaustReason::MaxAttemptsReached => "maximum walk attempts reached",
            ExhaustReason::OldestDateReached => "oldest allowed date reached",
        })
    }
}

/// Per-request walk bookkeeping.
///
/// Holds `current_probe_date >= oldest_allowed_date` and
/// `attempt <= max_attempts`; a step that would break either ends the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    pub requested_date: NaiveDate,
    pub current_probe_date: NaiveDate,
    pub attempt: u32,
    pub max_attempts: u32,
    pub oldest_allowed_date: NaiveDate,
}

impl RetryState {
    pub fn start(
        requested_date: NaiveDate,
        policy: WalkPolicy,
        today: NaiveDate,
    ) -> Result<Self, ExhaustReason> {
        let oldest_allowed_date = policy.oldest_allowed(today);
        if requested_date < oldest_allowed_date {
            return Err(ExhaustReason::OldestDateReached);
        }
        Ok(Self {
            requested_date,
            current_probe_date: requested_date,
            attempt: 0,
            max_attempts: policy.max_attempts,
            oldest_allowed_date,
        })
    }

    /// Move one day back, or report which bound stops the walk.
    pub fn step_back(&mut self) -> Result<(), ExhaustReason> {
        if self.attempt >= self.max_attempts {
            return Err(ExhaustReason::MaxAttemptsReached);
        }
        match self.current_probe_date.pred_opt() {
            Some(prev) if prev >= self.oldest_allowed_date => {
                self.current_probe_date = prev;
                self.attempt += 1;
                Ok(())
            }
            _ => Err(ExhaustReason::OldestDateReached),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSuccess {
    pub record: DayRecord,
    pub cached: bool,
    pub requested_date: NaiveDate,
    pub final_date: NaiveDate,
    /// Steps walked back; 0 when the requested date resolved directly.
    pub attempts: u32,
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("walk from {requested} exhausted at {last_probe} after {attempts} steps: {reason}")]
    Exhausted {
        reason: ExhaustReason,
        requested: NaiveDate,
        last_probe: NaiveDate,
        attempts: u32,
    },

    #[error(transparent)]
    Failed(#[from] PotdError),
}

/// Resolves a date, walking backwards one day at a time while the provider
/// reports nothing published.
#[derive(Clone)]
pub struct RetryWalkController {
    resolver: Arc<DayResolver>,
    policy: WalkPolicy,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RetryWalkController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryWalkController")
            .field("policy", &self.policy)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl RetryWalkController {
    pub fn new(
        resolver: Arc<DayResolver>,
        policy: WalkPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> WalkPolicy {
        self.policy
    }

    pub async fn walk(
        &self,
        requested: NaiveDate,
    ) -> Result<WalkSuccess, WalkError> {
        let mut state =
            RetryState::start(requested, self.policy, self.clock.today())
                .map_err(|reason| {
                    warn!(%requested, "requested date is outside the walk horizon");
                    WalkError::Exhausted {
                        reason,
                        requested,
                        last_probe: requested,
                        attempts: 0,
                    }
                })?;

        // Probes run strictly one after another; each depends on the last.
        loop {
            match self.resolver.resolve(state.current_probe_date).await {
                Ok(Resolution { record, cached }) => {
                    if state.attempt > 0 {
                        info!(
                            %requested,
                            final_date = %state.current_probe_date,
                            attempts = state.attempt,
                            "walked back to an earlier day"
                        );
                    }
                    return Ok(WalkSuccess {
                        record,
                        cached,
                        requested_date: requested,
                        final_date: state.current_probe_date,
                        attempts: state.attempt,
                    });
                }
                Err(PotdError::NoDataForDate(date)) => {
                    debug!(%date, attempt = state.attempt, "no data, stepping back");
                    if let Err(reason) = state.step_back() {
                        warn!(
                            %requested,
                            last_probe = %state.current_probe_date,
                            %reason,
                            "walk exhausted"
                        );
                        return Err(WalkError::Exhausted {
                            reason,
                            requested,
                            last_probe: state.current_probe_date,
                            attempts: state.attempt,
                        });
                    }
                }
                Err(other) => return Err(WalkError::Failed(other)),
            }
        }
    }

    /// Walk and, on success, move the navigation cursor to the day that
    /// actually resolved.
    pub async fn walk_and_commit(
        &self,
        cursor: &DateCursor,
        requested: NaiveDate,
    ) -> Result<WalkSuccess, WalkError> {
        let success = self.walk(requested).await?;
        if !cursor.commit_resolved(requested, success.final_date) {
            debug!(
                %requested,
                current = %cursor.current(),
                "cursor moved on; leaving it in place"
            );
        }
        Ok(success)
    }
}
