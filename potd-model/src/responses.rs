//! Request/response bodies of the HTTP surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::day::DayRecord;

/// Body of `POST /api/v1/picture`.
///
/// The date stays a raw string so malformed input can be rejected with a
/// typed error instead of a generic deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureRequest {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureResponse {
    pub data: DayRecord,
    /// True when the record was served from the record store rather than
    /// freshly fetched from the provider.
    pub cached: bool,
}

/// Where the caller can find the day's primary asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssetView {
    Local { path: PathBuf, downloaded: bool },
    Remote { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureViewResponse {
    pub data: DayRecord,
    pub cached: bool,
    pub requested_date: NaiveDate,
    pub final_date: NaiveDate,
    pub attempts: u32,
    pub asset: AssetView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoData,
    InvalidDate,
    MaxAttemptsReached,
    OldestDateReached,
    AssetUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub message: String,
}

impl ErrorBody {
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            error_code: None,
            date: None,
            message: message.into(),
        }
    }

    pub fn coded(
        code: ErrorCode,
        date: Option<NaiveDate>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_code: Some(code),
            date,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_error_carries_code_and_date() {
        let body = ErrorBody::coded(
            ErrorCode::NoData,
            NaiveDate::from_ymd_opt(2024, 10, 5),
            "no picture published for 2024-10-05",
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errorCode"], "NO_DATA");
        assert_eq!(json["date"], "2024-10-05");
    }

    #[test]
    fn generic_error_has_no_retry_code() {
        let json =
            serde_json::to_value(ErrorBody::generic("upstream failed")).unwrap();
        assert!(json.get("errorCode").is_none());
        assert_eq!(json["message"], "upstream failed");
    }

    #[test]
    fn asset_view_is_tagged_by_kind() {
        let json = serde_json::to_value(AssetView::Remote {
            url: "https://www.youtube.com/embed/xyz".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "remote");
    }
}
