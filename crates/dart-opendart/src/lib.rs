#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart-metrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenDART data provider for financial statement rows.
//!
//! This crate provides access to the Korean FSS electronic disclosure API:
//!
//! - Key-account rows of a periodic report (`fnlttSinglAcnt`)
//! - Full financial statement rows (`fnlttSinglAcntAll`)
//! - Status code classification for diagnostics
//!
//! Upstream status codes other than success are returned as data so that
//! [`dart_core::fetch_filing_rows`] can decide whether to fall back.

use async_trait::async_trait;
use dart_core::{
    DataError, DataProvider, FilingProvider, FilingQuery, FilingResult, FsDiv, Result,
};
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenDART API base URL.
const OPENDART_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Key-account endpoint (primary representation).
const SINGLE_ACCOUNT_ENDPOINT: &str = "fnlttSinglAcnt.json";

/// Full-statement endpoint (fallback representation).
const ALL_ACCOUNTS_ENDPOINT: &str = "fnlttSinglAcntAll.json";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPEN_DART_API_KEY";

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Classification of OpenDART status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DartStatus {
    /// 000: request processed.
    Ok,
    /// 010, 011, 012, 901: key unregistered, disabled, IP not allowed, or expired.
    Unauthorized,
    /// 013: no data for the request.
    NoData,
    /// 020: request limit exceeded.
    RateLimited,
    /// 100, 101: invalid field value or access.
    InvalidRequest,
    /// 800: maintenance.
    Maintenance,
    /// Anything else, including 900 (undefined error).
    Other,
}

impl DartStatus {
    /// Classifies a raw status code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "000" => Self::Ok,
            "010" | "011" | "012" | "901" => Self::Unauthorized,
            "013" => Self::NoData,
            "020" => Self::RateLimited,
            "100" | "101" => Self::InvalidRequest,
            "800" => Self::Maintenance,
            _ => Self::Other,
        }
    }
}

/// OpenDART filing provider.
///
/// Implements [`FilingProvider`] using the key-account endpoint as the
/// primary representation and the full-statement endpoint as the fallback.
#[derive(Clone)]
pub struct OpenDartProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for OpenDartProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenDartProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenDartProvider {
    /// Create a new provider with the given API key and default timeout.
    ///
    /// # Errors
    /// Returns [`DataError::MissingCredentials`] if the key is blank, or
    /// [`DataError::Other`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new provider with a custom request timeout.
    ///
    /// # Errors
    /// See [`OpenDartProvider::new`].
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("Failed to build HTTP client: {e}")))?;
        Self::with_client(client, api_key)
    }

    /// Create a new provider with a pre-configured HTTP client.
    ///
    /// # Errors
    /// Returns [`DataError::MissingCredentials`] if the key is blank.
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::MissingCredentials(format!(
                "OpenDART API key is empty (set {API_KEY_ENV})"
            )));
        }

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            base_url: OPENDART_BASE_URL.to_string(),
        })
    }

    /// Create a new provider from the `OPEN_DART_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    /// Returns [`DataError::MissingCredentials`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var(API_KEY_ENV)
            .map_err(|_| DataError::MissingCredentials(format!("{API_KEY_ENV} not set")))?;

        Self::new(api_key)
    }

    /// Point the provider at a different base URL (e.g. a local stub).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the query parameters shared by both endpoints.
    ///
    /// Parameters without a value are omitted.
    fn params(&self, query: &FilingQuery, fs_div: Option<FsDiv>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("crtfc_key", self.api_key.clone()),
            ("corp_code", query.corp_code.clone()),
            ("bsns_year", query.bsns_year.to_string()),
            ("reprt_code", query.reprt_code.code().to_string()),
        ];
        if let Some(fs_div) = fs_div {
            params.push(("fs_div", fs_div.code().to_string()));
        }
        params
    }

    /// Build the full URL of an endpoint.
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Make a GET request and parse the filing response.
    async fn get(
        &self,
        endpoint: &str,
        query: &FilingQuery,
        fs_div: Option<FsDiv>,
    ) -> Result<FilingResult> {
        debug!(endpoint, query = %query, "OpenDART request");

        let response = self
            .client
            .get(self.url(endpoint))
            .query(&self.params(query, fs_div))
            .send()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: self.name().to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "OpenDART {endpoint} returned HTTP {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        let result = parse_filing_response(&text)?;
        log_status(endpoint, &result);
        Ok(result)
    }
}

/// Parse an OpenDART filing response body.
fn parse_filing_response(text: &str) -> Result<FilingResult> {
    serde_json::from_str(text)
        .map_err(|e| DataError::Parse(format!("Failed to parse OpenDART response: {e}")))
}

/// Emit a diagnostic for non-success statuses.
fn log_status(endpoint: &str, result: &FilingResult) {
    match DartStatus::from_code(&result.status) {
        DartStatus::Ok => debug!(endpoint, rows = result.list.len(), "OpenDART response"),
        DartStatus::NoData => debug!(endpoint, message = %result.message, "OpenDART returned no data"),
        status => warn!(
            endpoint,
            ?status,
            code = %result.status,
            message = %result.message,
            "OpenDART returned an error status"
        ),
    }
}

impl DataProvider for OpenDartProvider {
    fn name(&self) -> &str {
        "OpenDART"
    }

    fn description(&self) -> &str {
        "Korean FSS electronic disclosure API for periodic report financial statements"
    }
}

#[async_trait]
impl FilingProvider for OpenDartProvider {
    async fn fetch_primary(&self, query: &FilingQuery) -> Result<FilingResult> {
        self.get(SINGLE_ACCOUNT_ENDPOINT, query, query.fs_div).await
    }

    async fn fetch_fallback(&self, query: &FilingQuery) -> Result<FilingResult> {
        // The full-statement endpoint requires fs_div
        let fs_div = query.fs_div.unwrap_or_default();
        self.get(ALL_ACCOUNTS_ENDPOINT, query, Some(fs_div)).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dart_core::{ReportCode, derive_metrics};

    const SINGLE_ACCOUNT_SAMPLE: &str = r#"{
        "status": "000",
        "message": "정상",
        "list": [
            {
                "rcept_no": "20240312000736",
                "bsns_year": "2023",
                "stock_code": "005930",
                "reprt_code": "11011",
                "account_nm": "자산총계",
                "fs_div": "CFS",
                "fs_nm": "연결재무제표",
                "sj_div": "BS",
                "sj_nm": "재무상태표",
                "thstrm_nm": "제 55 기",
                "thstrm_dt": "2023.12.31 현재",
                "thstrm_amount": "455,905,980,000,000",
                "frmtrm_amount": "448,424,507,000,000",
                "ord": "11",
                "currency": "KRW"
            },
            {
                "account_nm": "부채총계",
                "fs_div": "CFS",
                "thstrm_amount": "92,228,115,000,000"
            },
            {
                "account_nm": "자본총계",
                "fs_div": "CFS",
                "thstrm_amount": "363,677,865,000,000"
            },
            {
                "account_nm": "당기순이익(손실)",
                "fs_div": "CFS",
                "thstrm_amount": "15,487,100,000,000"
            }
        ]
    }"#;

    #[test]
    fn test_provider_metadata() {
        let provider = OpenDartProvider::new("test_key").unwrap();
        assert_eq!(provider.name(), "OpenDART");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = OpenDartProvider::new("secret_key_12345").unwrap();
        let debug_str = format!("{provider:?}");
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = OpenDartProvider::new("   ").unwrap_err();
        assert!(matches!(err, DataError::MissingCredentials(_)));
    }

    #[test]
    fn test_params_omit_missing_fs_div() {
        let provider = OpenDartProvider::new("k").unwrap();
        let query = FilingQuery::new("00126380", 2023, ReportCode::HalfYear);

        let params = provider.params(&query, None);
        assert_eq!(
            params,
            vec![
                ("crtfc_key", "k".to_string()),
                ("corp_code", "00126380".to_string()),
                ("bsns_year", "2023".to_string()),
                ("reprt_code", "11012".to_string()),
            ]
        );

        let params = provider.params(&query, Some(FsDiv::Separate));
        assert_eq!(params.last(), Some(&("fs_div", "OFS".to_string())));
    }

    #[test]
    fn test_url_building() {
        let provider = OpenDartProvider::new("k").unwrap();
        assert_eq!(
            provider.url(SINGLE_ACCOUNT_ENDPOINT),
            "https://opendart.fss.or.kr/api/fnlttSinglAcnt.json"
        );

        let local = provider.with_base_url("http://127.0.0.1:8080/api/");
        assert_eq!(
            local.url(ALL_ACCOUNTS_ENDPOINT),
            "http://127.0.0.1:8080/api/fnlttSinglAcntAll.json"
        );
    }

    #[test]
    fn test_parse_single_account_response() {
        let result = parse_filing_response(SINGLE_ACCOUNT_SAMPLE).unwrap();
        assert!(result.is_acceptable());
        assert_eq!(result.list.len(), 4);
        assert_eq!(result.list[0].amount(), Some(455_905_980_000_000.0));
        assert_eq!(
            result.list[0].extra.get("sj_div").and_then(|v| v.as_str()),
            Some("BS")
        );

        let metrics = derive_metrics(&result.list);
        assert_eq!(metrics.net_income, Some(15_487_100_000_000.0));
        assert!(metrics.roe.is_some());
        assert!(metrics.revenue.is_none());
    }

    #[test]
    fn test_parse_no_data_response() {
        let result =
            parse_filing_response(r#"{"status":"013","message":"조회된 데이타가 없습니다."}"#)
                .unwrap();
        assert_eq!(DartStatus::from_code(&result.status), DartStatus::NoData);
        assert!(!result.is_acceptable());
    }

    #[test]
    fn test_parse_malformed_response() {
        let err = parse_filing_response("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        let provider = OpenDartProvider::new("k")
            .unwrap()
            .with_base_url("http://127.0.0.1:9/api");
        let query = FilingQuery::new("00126380", 2023, ReportCode::Annual);
        let err = dart_core::fetch_filing_rows(&provider, &query)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Network(_)));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(DartStatus::from_code("000"), DartStatus::Ok);
        assert_eq!(DartStatus::from_code("010"), DartStatus::Unauthorized);
        assert_eq!(DartStatus::from_code("020"), DartStatus::RateLimited);
        assert_eq!(DartStatus::from_code("100"), DartStatus::InvalidRequest);
        assert_eq!(DartStatus::from_code("800"), DartStatus::Maintenance);
        assert_eq!(DartStatus::from_code("900"), DartStatus::Other);
    }
}
