//! Runtime configuration resolved from flags and environment.

use anyhow::{Context, Result, bail};
use dart::{
    DataError, MetricsService, NaverFinanceProvider, OpenDartProvider, SqliteDirectory,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default location of the corp-code database.
pub(crate) const DEFAULT_CORP_DB: &str = "data/corp_codes.db";

/// Default HTTP timeout in seconds.
pub(crate) const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default delay between market page requests in milliseconds.
pub(crate) const DEFAULT_MARKET_DELAY_MS: u64 = 500;

/// Settings shared by all subcommands.
#[derive(Debug)]
pub(crate) struct Config {
    api_key: Option<String>,
    pub(crate) corp_db: PathBuf,
    pub(crate) http_timeout: Duration,
    pub(crate) market_delay: Duration,
}

impl Config {
    pub(crate) fn new(api_key: Option<String>, corp_db: PathBuf, http_timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            corp_db,
            http_timeout: Duration::from_secs(http_timeout_secs.max(1)),
            market_delay: Duration::from_millis(DEFAULT_MARKET_DELAY_MS),
        }
    }

    pub(crate) const fn with_market_delay(mut self, delay_ms: u64) -> Self {
        self.market_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Open the corp-code database, which must already be seeded.
    pub(crate) fn open_directory(&self) -> Result<SqliteDirectory> {
        if !self.corp_db.exists() {
            bail!(
                "corp-code database {} not found; run `dart seed <CORPCODE.xml>` first",
                self.corp_db.display()
            );
        }
        SqliteDirectory::new(&self.corp_db)
            .with_context(|| format!("opening {}", self.corp_db.display()))
    }

    /// Build the metrics service.
    ///
    /// The directory is attached when the database exists; the market
    /// provider only when `with_market` is set.
    pub(crate) fn service(&self, with_market: bool) -> Result<MetricsService> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DataError::MissingCredentials(
                "OpenDART API key required (--api-key or OPEN_DART_API_KEY)".to_string(),
            )
        })?;

        let filings = OpenDartProvider::with_timeout(api_key, self.http_timeout)?;
        let mut service =
            MetricsService::new(Arc::new(filings)).with_market_timeout(self.http_timeout);

        if self.corp_db.exists() {
            service = service.with_directory(Arc::new(self.open_directory()?));
        } else {
            warn!(
                path = %self.corp_db.display(),
                "Corp-code database missing; stock metrics will be empty"
            );
        }

        if with_market {
            let market = NaverFinanceProvider::with_timeout(self.http_timeout)?
                .with_rate_limit(self.market_delay);
            service = service.with_market(Arc::new(market));
        }

        debug!(?service, "Service configured");
        Ok(service)
    }
}
