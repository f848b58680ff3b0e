#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart-metrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Corporation code directory implementations.
//!
//! This crate provides implementations of the [`CorpDirectory`] trait from `dart-core`:
//!
//! - [`SqliteDirectory`] - Persistent SQLite-based store (default, requires `sqlite` feature)
//! - [`InMemoryDirectory`] - Simple in-memory store for testing
//!
//! and [`parse_corp_codes`] for reading the published `CORPCODE.xml`.

/// In-memory directory implementation.
pub mod memory;
/// CORPCODE.xml parsing.
pub mod xml;

/// SQLite-based directory implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use dart_core::CorpDirectory;

pub use memory::InMemoryDirectory;
pub use xml::parse_corp_codes;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDirectory;
