use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use potd_model::day_key;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Result,
    infra::http::build_http_client,
    ports::{ProviderError, ProviderRecord, SourceApiClient},
};

pub const APOD_DEFAULT_BASE: &str = "https://api.nasa.gov/planetary/apod";

/// Prefix the provider uses in its "nothing published" message.
const NO_DATA_PREFIX: &str = "No data available";

/// NASA's Astronomy Picture of the Day API.
pub struct ApodApiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for ApodApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApodApiProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ApodQuery<'a> {
    api_key: &'a str,
    date: &'a str,
}

/// The provider reports errors in two shapes: APOD's own `{code, msg}` and
/// the api.nasa.gov gateway's `{error: {code, message}}`.
#[derive(Debug, Default, Deserialize)]
struct ApodErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<GatewayError>,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApodApiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SourceApiClient for ApodApiProvider {
    async fn fetch_by_date(
        &self,
        date: NaiveDate,
    ) -> std::result::Result<ProviderRecord, ProviderError> {
        let key = day_key(date);
        let query = ApodQuery {
            api_key: &self.api_key,
            date: &key,
        };

        debug!(date = %key, base = %self.base_url, "requesting picture from provider");
        let response = self.http.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str::<ProviderRecord>(&body).map_err(
                |err| ProviderError::ParseError(format!("{err} in provider body")),
            );
        }

        let body = response.text().await.unwrap_or_default();
        let err = classify_failure(status.as_u16(), &body, date);
        if !matches!(err, ProviderError::NoData(_)) {
            warn!(date = %key, status = status.as_u16(), "provider request failed: {err}");
        }
        Err(err)
    }
}

/// Map a non-success provider response onto the provider error taxonomy.
///
/// Only a 4xx whose message says nothing is available counts as "no data".
/// Any other failure stays transport-class, including a bare 404 from a
/// wrong base URL or a proxy error page.
pub fn classify_failure(
    status: u16,
    body: &str,
    date: NaiveDate,
) -> ProviderError {
    let parsed: ApodErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .msg
        .clone()
        .or_else(|| parsed.error.as_ref().and_then(|e| e.message.clone()))
        .unwrap_or_else(|| format!("provider request failed with status {status}"));
    let gateway_code = parsed.error.as_ref().and_then(|e| e.code.as_deref());

    match status {
        400..=499 if message.starts_with(NO_DATA_PREFIX) => {
            ProviderError::NoData(date)
        }
        401 | 403 => ProviderError::InvalidApiKey,
        429 => ProviderError::RateLimited,
        _ if gateway_code == Some("OVER_RATE_LIMIT") => {
            ProviderError::RateLimited
        }
        _ => ProviderError::ApiError(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 5).unwrap()
    }

    #[test]
    fn not_found_is_no_data() {
        let body = r#"{"code":404,"msg":"No data available for date: 2024-10-05","service_version":"v1"}"#;
        assert!(matches!(
            classify_failure(404, body, day()),
            ProviderError::NoData(d) if d == day()
        ));
    }

    #[test]
    fn not_found_page_without_provider_message_is_an_api_error() {
        let body = "<html><body>404 Not Found</body></html>";
        match classify_failure(404, body, day()) {
            ProviderError::ApiError(msg) => assert!(msg.contains("404")),
            other => panic!("unexpected classification: {other:?}"),
        }
        assert!(matches!(
            classify_failure(404, r#"{"msg":"Not Found"}"#, day()),
            ProviderError::ApiError(_)
        ));
    }

    #[test]
    fn bad_request_with_no_data_message_is_no_data() {
        let body = r#"{"code":400,"msg":"No data available for date: 2024-10-05"}"#;
        assert!(matches!(
            classify_failure(400, body, day()),
            ProviderError::NoData(_)
        ));
    }

    #[test]
    fn out_of_range_dates_are_not_no_data() {
        let body = r#"{"code":400,"msg":"Date must be between Jun 16, 1995 and Oct 05, 2024."}"#;
        match classify_failure(400, body, day()) {
            ProviderError::ApiError(msg) => assert!(msg.starts_with("Date must be")),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn gateway_failures_keep_their_own_kinds() {
        let key = r#"{"error":{"code":"API_KEY_INVALID","message":"An invalid api_key was supplied."}}"#;
        assert!(matches!(
            classify_failure(403, key, day()),
            ProviderError::InvalidApiKey
        ));
        assert!(matches!(
            classify_failure(429, "", day()),
            ProviderError::RateLimited
        ));
        assert!(matches!(
            classify_failure(503, "<html>bad gateway</html>", day()),
            ProviderError::ApiError(_)
        ));
    }

    #[test]
    fn provider_payload_decodes() {
        let body = r#"{
            "copyright": "\nJohn Doe\n",
            "date": "2024-10-05",
            "explanation": "A comet over the desert.",
            "hdurl": "https://apod.nasa.gov/apod/image/2410/comet_big.jpg",
            "media_type": "image",
            "service_version": "v1",
            "title": "Comet Over Desert",
            "url": "https://apod.nasa.gov/apod/image/2410/comet_1024.jpg"
        }"#;
        let record: ProviderRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.date, day());
        assert_eq!(record.media_type, "image");
        assert!(record.hdurl.is_some());
    }

    #[test]
    fn payload_without_url_decodes() {
        let body = r#"{
            "date": "2024-10-05",
            "explanation": "An interactive page.",
            "media_type": "other",
            "service_version": "v1",
            "title": "Explore the Sky"
        }"#;
        let record: ProviderRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.media_type, "other");
        assert!(record.url.is_empty());
        assert!(record.hdurl.is_none());
    }
}
