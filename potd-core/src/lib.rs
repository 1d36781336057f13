//! # potd-core
//!
//! Resolution pipeline for "the picture of the day for date D".
//!
//! - [`application::DayResolver`]: cache-or-fetch for one date, backed by a
//!   remote record store with best-effort blob persistence.
//! - [`application::RetryWalkController`]: walks backwards while the provider
//!   has nothing for a date, bounded by an attempt cap and an oldest-date
//!   horizon.
//! - [`infra::cache::LocalCacheManager`]: materializes a day's asset onto local
//!   storage with a fixed source fallback order.
//! - [`application::PreloadOrchestrator`]: detached warm-up of neighbor days.
//!
//! Every collaborator is a trait in [`ports`], injected at construction.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod application;
pub mod clock;
pub mod error;
pub mod infra;
pub mod ports;

pub use application::{
    DateCursor, DayResolver, ExhaustReason, PictureService, PictureView,
    PipelineDeps, PreloadOrchestrator, PreloadTicket, Resolution,
    RetryWalkController, ViewError, WalkError, WalkPolicy, WalkSuccess,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PotdError, Result};
pub use infra::cache::{LocalCacheManager, MaterializedAsset};
