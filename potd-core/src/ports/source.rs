use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

/// One day as reported by the upstream provider, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderRecord {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub explanation: String,
    /// Absent for some `other` media days; the resolver falls back to `hdurl`.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hdurl: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider has nothing published for this day. This is the only
    /// provider outcome that may trigger a walk to an earlier date.
    #[error("No data available for date: {0}")]
    NoData(NaiveDate),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Authoritative source for a day's content.
#[async_trait]
pub trait SourceApiClient: Send + Sync {
    async fn fetch_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<ProviderRecord, ProviderError>;
}
