//! Metrics service combining filings, the corp-code directory and market data.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use dart_core::{
    CorpDirectory, CorpInfo, CorpSummary, DEFAULT_SEARCH_LIMIT, DataError, FilingProvider, FilingQuery,
    FilingResult, MarketMetricsProvider, MetricsReport, Result, StockMetrics, derive_metrics,
    fetch_filing_rows,
};

/// Default upper bound on a market metrics lookup.
pub const DEFAULT_MARKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Service running the metrics pipeline for one filing per call.
///
/// A filing provider is required. The market provider and the corp-code
/// directory are optional; without them the `stock` part of a report is
/// left missing.
///
/// # Example
///
/// ```rust,ignore
/// use dart::{FilingQuery, MetricsService, ReportCode};
///
/// let service = MetricsService::with_opendart("my-key")?.with_naver()?;
/// let query = FilingQuery::new("00126380", 2023, ReportCode::Annual);
/// let report = service.metrics(&query).await?;
/// ```
#[derive(Clone)]
pub struct MetricsService {
    filings: Arc<dyn FilingProvider>,
    market: Option<Arc<dyn MarketMetricsProvider>>,
    directory: Option<Arc<dyn CorpDirectory>>,
    market_timeout: Duration,
}

impl std::fmt::Debug for MetricsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsService")
            .field("filings", &self.filings.name())
            .field("market", &self.market.as_ref().map(|p| p.name()))
            .field("directory", &self.directory.as_ref().map(|_| "configured"))
            .field("market_timeout", &self.market_timeout)
            .finish()
    }
}

impl MetricsService {
    /// Create a service around a filing provider.
    #[must_use]
    pub fn new(filings: Arc<dyn FilingProvider>) -> Self {
        debug!(provider = filings.name(), "Creating metrics service");
        Self {
            filings,
            market: None,
            directory: None,
            market_timeout: DEFAULT_MARKET_TIMEOUT,
        }
    }

    /// Create a service backed by OpenDART with the given API key.
    ///
    /// # Errors
    /// Returns [`DataError::MissingCredentials`] if the key is blank.
    #[cfg(feature = "opendart")]
    pub fn with_opendart(api_key: &str) -> Result<Self> {
        let provider = dart_opendart::OpenDartProvider::new(api_key)?;
        Ok(Self::new(Arc::new(provider)))
    }

    /// Create a service backed by OpenDART, reading the key from the environment.
    ///
    /// # Errors
    /// Returns [`DataError::MissingCredentials`] if `OPEN_DART_API_KEY` is not set.
    #[cfg(feature = "opendart")]
    pub fn with_opendart_from_env() -> Result<Self> {
        let provider = dart_opendart::OpenDartProvider::from_env()?;
        Ok(Self::new(Arc::new(provider)))
    }

    /// Add the Naver Finance market metrics provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[cfg(feature = "naver")]
    pub fn with_naver(self) -> Result<Self> {
        let provider = dart_naver::NaverFinanceProvider::new()?;
        Ok(self.with_market(Arc::new(provider)))
    }

    /// Set the market metrics provider.
    #[must_use]
    pub fn with_market(mut self, market: Arc<dyn MarketMetricsProvider>) -> Self {
        debug!(provider = market.name(), "Registering market provider");
        self.market = Some(market);
        self
    }

    /// Set the corp-code directory used for search and listing codes.
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn CorpDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Set the upper bound on a market metrics lookup.
    #[must_use]
    pub const fn with_market_timeout(mut self, timeout: Duration) -> Self {
        self.market_timeout = timeout;
        self
    }

    /// Fetch the rows of a filing, falling back once if needed.
    ///
    /// # Errors
    /// Returns validation errors, or the fallback call's error.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn financials(&self, query: &FilingQuery) -> Result<FilingResult> {
        fetch_filing_rows(self.filings.as_ref(), query).await
    }

    /// Fetch a filing, derive its metrics and attach market figures.
    ///
    /// Market lookup failures never fail the report; they leave the stock
    /// figures missing.
    ///
    /// # Errors
    /// Returns validation errors, or the fallback call's error.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn metrics(&self, query: &FilingQuery) -> Result<MetricsReport> {
        let filing = fetch_filing_rows(self.filings.as_ref(), query).await?;
        let metrics = derive_metrics(&filing.list);
        let stock = self.stock_metrics(&query.corp_code).await;

        debug!(
            rows = filing.list.len(),
            listed = stock.stock_code.is_some(),
            "Metrics report assembled"
        );
        Ok(MetricsReport::new(filing, metrics, stock))
    }

    /// Search the corp-code directory by name.
    ///
    /// # Errors
    /// Returns [`DataError::ProviderNotConfigured`] if no directory is set,
    /// or the directory's error.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<CorpSummary>> {
        let directory = self.directory.as_ref().ok_or_else(|| {
            DataError::ProviderNotConfigured("No corp-code directory configured".to_string())
        })?;

        let hits = directory.search(query, DEFAULT_SEARCH_LIMIT).await?;
        Ok(hits.into_iter().map(CorpSummary::from).collect())
    }

    /// Look up one corporation by its 8 digit corp code.
    ///
    /// # Errors
    /// Returns [`DataError::ProviderNotConfigured`] if no directory is set,
    /// [`DataError::CorpNotFound`] for an unknown code, or the directory's error.
    #[instrument(skip(self))]
    pub async fn corp(&self, corp_code: &str) -> Result<CorpInfo> {
        let directory = self.directory.as_ref().ok_or_else(|| {
            DataError::ProviderNotConfigured("No corp-code directory configured".to_string())
        })?;

        directory
            .find_by_code(corp_code.trim())
            .await?
            .ok_or_else(|| DataError::CorpNotFound(corp_code.trim().to_string()))
    }

    /// Resolve the corporation's listing code and query the market provider.
    async fn stock_metrics(&self, corp_code: &str) -> StockMetrics {
        let Some(directory) = &self.directory else {
            return StockMetrics::missing(None);
        };

        let info = match directory.find_by_code(corp_code).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!(corp_code, "Corporation not in directory");
                return StockMetrics::missing(None);
            }
            Err(e) => {
                warn!(corp_code, error = %e, "Directory lookup failed");
                return StockMetrics::missing(None);
            }
        };

        let stock_code = Some(info.stock_code.trim().to_string()).filter(|s| !s.is_empty());
        let (Some(listed), Some(market)) = (info.listed_stock_code(), &self.market) else {
            return StockMetrics::missing(stock_code);
        };

        match tokio::time::timeout(self.market_timeout, market.market_metrics(listed)).await {
            Ok(Ok(figures)) => StockMetrics::with_market(stock_code, figures),
            Ok(Err(e)) => {
                warn!(
                    provider = market.name(),
                    stock_code = listed,
                    error = %e,
                    "Market metrics unavailable"
                );
                StockMetrics::missing(stock_code)
            }
            Err(_) => {
                warn!(
                    provider = market.name(),
                    stock_code = listed,
                    timeout_ms = u64::try_from(self.market_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Market metrics timed out"
                );
                StockMetrics::missing(stock_code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use dart_core::{DataProvider, FilingRow, MarketMetrics, ReportCode};
    use dart_corp::InMemoryDirectory;

    #[derive(Debug)]
    struct StaticFilings {
        primary: FilingResult,
        fallback: FilingResult,
    }

    impl DataProvider for StaticFilings {
        fn name(&self) -> &str {
            "static"
        }

        fn description(&self) -> &str {
            "Returns fixed filings"
        }
    }

    #[async_trait]
    impl FilingProvider for StaticFilings {
        async fn fetch_primary(&self, _query: &FilingQuery) -> Result<FilingResult> {
            Ok(self.primary.clone())
        }

        async fn fetch_fallback(&self, _query: &FilingQuery) -> Result<FilingResult> {
            Ok(self.fallback.clone())
        }
    }

    #[derive(Debug)]
    enum MarketBehavior {
        Figures(MarketMetrics),
        Fail,
        Hang,
    }

    #[derive(Debug)]
    struct MockMarket(MarketBehavior);

    impl DataProvider for MockMarket {
        fn name(&self) -> &str {
            "mock-market"
        }

        fn description(&self) -> &str {
            "Scripted market figures"
        }
    }

    #[async_trait]
    impl MarketMetricsProvider for MockMarket {
        async fn market_metrics(&self, _stock_code: &str) -> Result<MarketMetrics> {
            match &self.0 {
                MarketBehavior::Figures(m) => Ok(*m),
                MarketBehavior::Fail => Err(DataError::Network("connection refused".into())),
                MarketBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(MarketMetrics::default())
                }
            }
        }
    }

    fn sample_rows() -> Vec<FilingRow> {
        vec![
            FilingRow::new("자산총계", "1,000"),
            FilingRow::new("부채총계", "400"),
            FilingRow::new("자본총계", "600"),
            FilingRow::new("당기순이익", "60"),
        ]
    }

    fn service(primary: FilingResult) -> MetricsService {
        MetricsService::new(Arc::new(StaticFilings {
            primary,
            fallback: FilingResult::new("013", "조회된 데이타가 없습니다.", Vec::new()),
        }))
    }

    fn directory() -> Arc<InMemoryDirectory> {
        Arc::new(InMemoryDirectory::with_entries(&[
            CorpInfo::new("00126380", "삼성전자").with_stock_code("005930"),
            CorpInfo::new("00434003", "다코"),
        ]))
    }

    fn query(corp_code: &str) -> FilingQuery {
        FilingQuery::new(corp_code, 2023, ReportCode::Annual)
    }

    #[tokio::test]
    async fn test_end_to_end_ratios() {
        let svc = service(FilingResult::new("000", "정상", sample_rows()));
        let report = svc.metrics(&query("00126380")).await.unwrap();

        assert_eq!(report.status, "000");
        assert_eq!(report.list, sample_rows());
        assert_relative_eq!(report.metrics.debt_ratio.unwrap(), 66.666_666_666, epsilon = 1e-6);
        assert_relative_eq!(report.metrics.roa.unwrap(), 6.0);
        assert_relative_eq!(report.metrics.roe.unwrap(), 10.0);
        assert_eq!(report.stock, StockMetrics::missing(None));
    }

    #[tokio::test]
    async fn test_market_figures_attached() {
        let market = MarketMetrics {
            per: Some(12.5),
            pbr: Some(1.1),
            eps: None,
        };
        let svc = service(FilingResult::new("000", "정상", sample_rows()))
            .with_directory(directory())
            .with_market(Arc::new(MockMarket(MarketBehavior::Figures(market))));

        let report = svc.metrics(&query("00126380")).await.unwrap();
        assert_eq!(report.stock.stock_code.as_deref(), Some("005930"));
        assert_eq!(report.stock.per, Some(12.5));
        assert_eq!(report.stock.pbr, Some(1.1));
        assert_eq!(report.stock.eps, None);
    }

    #[tokio::test]
    async fn test_market_failure_is_isolated() {
        let svc = service(FilingResult::new("000", "정상", sample_rows()))
            .with_directory(directory())
            .with_market(Arc::new(MockMarket(MarketBehavior::Fail)));

        let report = svc.metrics(&query("00126380")).await.unwrap();
        assert_relative_eq!(report.metrics.roe.unwrap(), 10.0);
        assert_eq!(report.stock, StockMetrics::missing(Some("005930".into())));
    }

    #[tokio::test]
    async fn test_market_timeout_is_isolated() {
        let svc = service(FilingResult::new("000", "정상", sample_rows()))
            .with_directory(directory())
            .with_market(Arc::new(MockMarket(MarketBehavior::Hang)))
            .with_market_timeout(Duration::from_millis(20));

        let report = svc.metrics(&query("00126380")).await.unwrap();
        assert!(report.metrics.total_assets.is_some());
        assert_eq!(report.stock.per, None);
        assert_eq!(report.stock.stock_code.as_deref(), Some("005930"));
    }

    #[tokio::test]
    async fn test_unlisted_corp_skips_market() {
        let svc = service(FilingResult::new("000", "정상", sample_rows()))
            .with_directory(directory())
            .with_market(Arc::new(MockMarket(MarketBehavior::Fail)));

        let report = svc.metrics(&query("00434003")).await.unwrap();
        assert_eq!(report.stock, StockMetrics::missing(None));
    }

    #[tokio::test]
    async fn test_empty_filing_yields_sentinels() {
        let svc = service(FilingResult::new("000", "", Vec::new()));
        let report = svc.metrics(&query("00126380")).await.unwrap();

        // Fallback result is final, even when empty
        assert_eq!(report.status, "013");
        assert!(report.list.is_empty());
        assert_eq!(report.metrics.revenue, None);
        assert_eq!(report.metrics.roe, None);
        assert_eq!(report.metrics.ebitda, Some(0.0));
    }

    #[tokio::test]
    async fn test_report_serializes_missing_as_null() {
        let svc = service(FilingResult::new("000", "정상", vec![FilingRow::new("매출액", "-")]));
        let report = svc.metrics(&query("00126380")).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["metrics"]["revenue"].is_null());
        assert!(json["metrics"]["debtRatio"].is_null());
        assert!(json["stock"]["per"].is_null());
        assert_eq!(json["list"][0]["thstrm_amount"], "-");
    }

    #[tokio::test]
    async fn test_invalid_query_rejected() {
        let svc = service(FilingResult::new("000", "정상", sample_rows()));
        let err = svc.metrics(&query("1263")).await.unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_financials_passes_rows_through() {
        let svc = service(FilingResult::new("000", "정상", sample_rows()));
        let filing = svc.financials(&query("00126380")).await.unwrap();
        assert_eq!(filing.list, sample_rows());
    }

    #[tokio::test]
    async fn test_search() {
        let svc = service(FilingResult::default());
        let err = svc.search("삼성").await.unwrap_err();
        assert!(matches!(err, DataError::ProviderNotConfigured(_)));

        let svc = svc.with_directory(directory());
        let hits = svc.search("삼성").await.unwrap();
        assert_eq!(
            hits,
            vec![CorpSummary {
                corp_code: "00126380".into(),
                corp_name: "삼성전자".into(),
                stock_code: "005930".into(),
            }]
        );
        assert!(svc.search("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corp_lookup() {
        let svc = service(FilingResult::default());
        let err = svc.corp("00126380").await.unwrap_err();
        assert!(matches!(err, DataError::ProviderNotConfigured(_)));

        let svc = svc.with_directory(directory());
        let info = svc.corp(" 00126380 ").await.unwrap();
        assert_eq!(info.corp_name, "삼성전자");

        let err = svc.corp("99999999").await.unwrap_err();
        assert!(matches!(err, DataError::CorpNotFound(ref code) if code == "99999999"));
        assert_eq!(err.to_string(), "Corporation not found: 99999999");
    }

    #[tokio::test]
    async fn test_metrics_survive_odd_upstream_rows() {
        let body = r#"{
            "status": "000",
            "message": "정상",
            "list": [
                {"account_nm": "자산총계", "thstrm_amount": 1000},
                {"account_nm": "부채총계", "thstrm_amount": "400"},
                {"account_nm": "자본총계", "thstrm_amount": "600"},
                {"account_nm": "당기순이익", "thstrm_amount": "60"},
                {"account_nm": "기타포괄손익", "thstrm_amount": null},
                7
            ]
        }"#;
        let filing: FilingResult = serde_json::from_str(body).unwrap();
        let report = service(filing).metrics(&query("00126380")).await.unwrap();

        assert_eq!(report.list.len(), 5);
        assert_relative_eq!(report.metrics.roa.unwrap(), 6.0);
        assert_relative_eq!(report.metrics.roe.unwrap(), 10.0);
    }

    #[test]
    fn test_debug_lists_providers() {
        let svc = service(FilingResult::default())
            .with_market(Arc::new(MockMarket(MarketBehavior::Fail)));
        let debug_str = format!("{svc:?}");
        assert!(debug_str.contains("static"));
        assert!(debug_str.contains("mock-market"));
    }
}
