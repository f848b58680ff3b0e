#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart-metrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Naver Finance market metrics provider.
//!
//! This crate provides a [`MarketMetricsProvider`] that reads valuation
//! figures from the public item page of a KRX listed security.
//!
//! # Features
//!
//! - Dedicated element ids (`#_per`, `#_pbr`, `#_eps`) are read first
//! - Any figure still missing is looked up in the `per_table` summary
//! - Built-in rate limiting (one request per 500ms by default)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dart_core::{DataError, DataProvider, MarketMetrics, MarketMetricsProvider, Result};
use scraper::{ElementRef, Html, Selector};
use tokio::time::sleep;
use tracing::debug;

/// Naver Finance item page URL.
const ITEM_PAGE_URL: &str = "https://finance.naver.com/item/main.nhn";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 500;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Naver Finance market metrics provider.
///
/// Implements [`DataProvider`] and [`MarketMetricsProvider`].
#[derive(Debug)]
pub struct NaverFinanceProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl NaverFinanceProvider {
    /// Create a new provider with default settings.
    ///
    /// # Errors
    /// Returns [`DataError::Other`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new provider with a custom request timeout.
    ///
    /// # Errors
    /// Returns [`DataError::Other`] if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    /// Create a new provider with a custom HTTP client.
    ///
    /// The client should send a browser user agent; the page is not served
    /// to unknown agents.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: ITEM_PAGE_URL.to_string(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Set the minimum delay between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit_ms = u64::try_from(rate_limit.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Point the provider at a different item page URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = now_millis();
        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(now_millis(), Ordering::Relaxed);
    }

    /// Build the item page URL for a stock code.
    fn build_item_url(&self, stock_code: &str) -> String {
        format!("{}?code={stock_code}", self.base_url)
    }

    /// Fetch the raw item page.
    async fn fetch_item_page(&self, stock_code: &str) -> Result<String> {
        self.apply_rate_limit().await;

        let url = self.build_item_url(stock_code);
        debug!("Fetching Naver item page: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: self.name().to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "Naver Finance returned HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Returns true if `code` is a six digit KRX listing code.
#[must_use]
pub fn is_stock_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a figure as printed on the item page.
///
/// Thousands separators and surrounding whitespace are removed. Empty,
/// non-numeric and non-finite text yields `None`.
#[must_use]
pub fn parse_market_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extracts PER, PBR and EPS from an item page.
///
/// # Errors
/// Returns [`DataError::Parse`] only if a selector fails to compile.
pub fn parse_market_html(html: &str) -> Result<MarketMetrics> {
    let document = Html::parse_document(html);

    let mut metrics = MarketMetrics {
        per: by_id(&document, "#_per")?,
        pbr: by_id(&document, "#_pbr")?,
        eps: by_id(&document, "#_eps")?,
    };

    if metrics.per.is_none() {
        metrics.per = from_per_table(&document, "PER")?;
    }
    if metrics.pbr.is_none() {
        metrics.pbr = from_per_table(&document, "PBR")?;
    }
    if metrics.eps.is_none() {
        metrics.eps = from_per_table(&document, "EPS")?;
    }

    Ok(metrics)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::Parse(format!("Invalid selector {css}: {e}")))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Reads the first element matching `css`.
fn by_id(document: &Html, css: &str) -> Result<Option<f64>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| parse_market_number(&text_of(el))))
}

/// Scans `table.per_table` rows whose header mentions `label`.
///
/// The last row that parses wins.
fn from_per_table(document: &Html, label: &str) -> Result<Option<f64>> {
    let rows = selector("table.per_table tr")?;
    let th = selector("th")?;
    let td = selector("td")?;

    let mut value = None;
    for row in document.select(&rows) {
        let header: String = row.select(&th).map(text_of).collect();
        if !header.contains(label) {
            continue;
        }
        let cells: String = row.select(&td).map(text_of).collect();
        if let Some(candidate) = parse_market_number(&cells) {
            value = Some(candidate);
        }
    }
    Ok(value)
}

impl Default for NaverFinanceProvider {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

impl DataProvider for NaverFinanceProvider {
    fn name(&self) -> &str {
        "Naver Finance"
    }

    fn description(&self) -> &str {
        "PER, PBR and EPS from the Naver Finance item page for KRX listed securities"
    }
}

#[async_trait]
impl MarketMetricsProvider for NaverFinanceProvider {
    async fn market_metrics(&self, stock_code: &str) -> Result<MarketMetrics> {
        let stock_code = stock_code.trim();
        if !is_stock_code(stock_code) {
            return Err(DataError::InvalidParameter(format!(
                "stock code must be 6 digits, got {stock_code:?}"
            )));
        }

        let html = self.fetch_item_page(stock_code).await?;
        let metrics = parse_market_html(&html)?;
        debug!(
            stock_code,
            per = ?metrics.per,
            pbr = ?metrics.pbr,
            eps = ?metrics.eps,
            "Parsed Naver market metrics"
        );
        Ok(metrics)
    }
}
