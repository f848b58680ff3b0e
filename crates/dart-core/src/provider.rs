//! Provider traits for filings and market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`FilingProvider`] - Primary and fallback filing representations
//! - [`MarketMetricsProvider`] - Valuation figures for a listed security

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    query::FilingQuery,
    types::{FilingResult, MarketMetrics},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "OpenDART").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider of financial filing rows.
///
/// Upstream exposes two representations of the same filing: a compact one
/// that fails for companies with large disclosure sets, and a complete one
/// that covers them but is less consistently shaped. Neither call should
/// interpret the status code; that is left to
/// [`fetch_filing_rows`](crate::retriever::fetch_filing_rows).
#[async_trait]
pub trait FilingProvider: DataProvider {
    /// Fetches the primary representation of a filing.
    async fn fetch_primary(&self, query: &FilingQuery) -> Result<FilingResult>;

    /// Fetches the fallback representation of a filing.
    async fn fetch_fallback(&self, query: &FilingQuery) -> Result<FilingResult>;
}

/// Provider of valuation figures (PER, PBR, EPS) for a listed security.
///
/// Callers treat any error as "no data" and carry on with missing figures.
#[async_trait]
pub trait MarketMetricsProvider: DataProvider {
    /// Fetches market metrics for a six digit stock code.
    async fn market_metrics(&self, stock_code: &str) -> Result<MarketMetrics>;
}
