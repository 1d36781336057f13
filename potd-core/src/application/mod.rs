//! The resolution pipeline: resolve, walk back, materialize, preload.

pub mod blob_naming;
pub mod cursor;
pub mod day_resolver;
pub mod picture_service;
pub mod preload;
pub mod retry_walk;

pub use cursor::DateCursor;
pub use day_resolver::{DayResolver, Resolution};
pub use picture_service::{PictureService, PictureView, PipelineDeps, ViewError};
pub use preload::{PreloadOrchestrator, PreloadTicket};
pub use retry_walk::{
    DEFAULT_MAX_WALK_ATTEMPTS, DEFAULT_WALK_HORIZON_DAYS, ExhaustReason,
    RetryState, RetryWalkController, WalkError, WalkPolicy, WalkSuccess,
};
