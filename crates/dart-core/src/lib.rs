#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart-metrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits, types and metrics derivation for OpenDART filings.
//!
//! This crate provides the foundational pieces of the pipeline:
//!
//! - [`parse_amount`](amount::parse_amount) - Locale-formatted amount parsing
//! - [`find_amount`](locator::find_amount) - First-match label lookup over filing rows
//! - [`derive_metrics`](metrics::derive_metrics) - Fixed ratio set from a filing
//! - [`fetch_filing_rows`](retriever::fetch_filing_rows) - Primary/fallback retrieval
//! - [`FilingProvider`](provider::FilingProvider) - Filing source abstraction
//! - [`MarketMetricsProvider`](provider::MarketMetricsProvider) - PER/PBR/EPS source
//! - [`CorpDirectory`](directory::CorpDirectory) - Corporation code store

/// Locale-formatted amount parsing.
pub mod amount;
/// Corporation directory trait.
pub mod directory;
/// Error types for data operations.
pub mod error;
/// Tabular export of filing rows.
pub mod frame;
/// Label-pattern lookup of accounting concepts.
pub mod locator;
/// Metrics derivation.
pub mod metrics;
/// Provider traits for filings and market data.
pub mod provider;
/// Filing identifiers and validation.
pub mod query;
/// Primary/fallback filing retrieval.
pub mod retriever;
/// Core data types (FilingRow, FilingResult, StockMetrics, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use amount::parse_amount;
pub use directory::{CorpDirectory, DEFAULT_SEARCH_LIMIT};
pub use error::{DataError, Result};
pub use frame::rows_to_frame;
pub use locator::{AccountConcept, ConceptMap, find_amount};
pub use metrics::{ConceptValues, FilingMetrics, derive_metrics, derive_metrics_with, ratio};
pub use provider::{DataProvider, FilingProvider, MarketMetricsProvider};
pub use query::{FilingQuery, FsDiv, ReportCode};
pub use retriever::{FilingSource, fetch_filing_rows, fetch_filing_rows_traced};
pub use types::{
    CorpInfo, CorpSummary, FilingResult, FilingRow, MarketMetrics, MetricsReport, STATUS_OK,
    StockMetrics,
};
