//! Core data model definitions shared across the picture-of-the-day crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod date;
pub mod day;
pub mod error;
pub mod responses;

// Intentionally curated re-exports for downstream consumers.
pub use date::{DAY_KEY_FORMAT, day_key, parse_day_key};
pub use day::{DayRecord, MediaKind, NewDayRecord};
pub use error::{ModelError, Result as ModelResult};
pub use responses::{
    AssetView, ErrorBody, ErrorCode, PictureRequest, PictureResponse,
    PictureViewResponse,
};
