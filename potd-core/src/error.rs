use chrono::NaiveDate;
use potd_model::ModelError;
use thiserror::Error;

/// Failure taxonomy of the resolution pipeline.
///
/// `NoDataForDate` is the only variant the walk-back controller reacts to;
/// every other variant terminates a walk as-is.
#[derive(Error, Debug)]
pub enum PotdError {
    #[error("invalid date format: {0:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("no picture published for {0}")]
    NoDataForDate(NaiveDate),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("asset unavailable for {date}: all {attempted} download sources failed")]
    AssetUnavailable { date: NaiveDate, attempted: usize },

    #[error("blob upload failed for {key}: {message}")]
    BlobUpload { key: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PotdError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, PotdError::NoDataForDate(_))
    }
}

impl From<ModelError> for PotdError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidDate(raw) => PotdError::InvalidDateFormat(raw),
            other => PotdError::Transport(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for PotdError {
    fn from(err: reqwest::Error) -> Self {
        PotdError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PotdError>;
