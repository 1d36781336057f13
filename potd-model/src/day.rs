use std::fmt::{self, Display};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Kind of primary asset attached to a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Map the provider's `media_type` string.
    ///
    /// Interactive pages (`"other"`) are streamed/opened remotely just like
    /// videos, so they collapse into [`MediaKind::Video`].
    pub fn from_provider(raw: &str) -> Result<Self, ModelError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" | "other" => Ok(MediaKind::Video),
            _ => Err(ModelError::UnknownMediaKind(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day's authoritative content.
///
/// Write-once: the pipeline creates a record the first time a date resolves
/// and only ever reads it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    pub primary_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_def_url: Option<String>,
    pub media_kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd_blob_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DayRecord {
    pub fn is_image(&self) -> bool {
        self.media_kind == MediaKind::Image
    }
}

/// Insert payload for a record; the store stamps the timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDayRecord {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    pub primary_url: String,
    pub high_def_url: Option<String>,
    pub media_kind: MediaKind,
    pub attribution: Option<String>,
    pub blob_path: Option<String>,
    pub hd_blob_path: Option<String>,
}

impl NewDayRecord {
    pub fn into_record(self, now: DateTime<Utc>) -> DayRecord {
        DayRecord {
            date: self.date,
            title: self.title,
            explanation: self.explanation,
            primary_url: self.primary_url,
            high_def_url: self.high_def_url,
            media_kind: self.media_kind,
            attribution: self.attribution,
            blob_path: self.blob_path,
            hd_blob_path: self.hd_blob_path,
            created_at: now,
            updated_at: now,
        }
    }
}
