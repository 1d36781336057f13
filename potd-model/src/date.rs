//! Calendar-day keys.
//!
//! Every record and every local cache entry is keyed by a single calendar day
//! rendered as `YYYY-MM-DD`. Parsing is two-staged: a lexical check against
//! the wire pattern, then a calendar check, so `"2024-13-40"` and
//! `"10-05-2024"` are both rejected before anything touches the network.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ModelError, Result};

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

static DAY_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static day key regex")
});

/// Parse a wire date string into a calendar day.
pub fn parse_day_key(raw: &str) -> Result<NaiveDate> {
    if !DAY_KEY_PATTERN.is_match(raw) {
        return Err(ModelError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DAY_KEY_FORMAT)
        .map_err(|_| ModelError::InvalidDate(raw.to_string()))
}

/// Render a calendar day as its stable `YYYY-MM-DD` key.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}
