#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart-metrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenDART financial metrics behind a single service.
//!
//! This crate re-exports core types and provider implementations, and
//! provides a [`MetricsService`] that runs the retrieval, derivation and
//! market lookup chain for one filing at a time.
//!
//! # Features
//!
//! - `opendart` - OpenDART filing provider
//! - `naver` - Naver Finance market metrics provider
//! - `corp-sqlite` - SQLite-based corp-code directory

// Core types and traits
pub use dart_core::*;

// Directory implementations
#[cfg(feature = "corp-sqlite")]
pub use dart_corp::SqliteDirectory;
pub use dart_corp::{InMemoryDirectory, parse_corp_codes};

// Providers
#[cfg(feature = "naver")]
pub use dart_naver::NaverFinanceProvider;
#[cfg(feature = "opendart")]
pub use dart_opendart::OpenDartProvider;

mod service;
pub use service::{DEFAULT_MARKET_TIMEOUT, MetricsService};
