//! Corporation directory trait.
//!
//! This module defines the [`CorpDirectory`] trait that provides a unified
//! interface for looking up and searching corporation codes.

use async_trait::async_trait;

use crate::{error::Result, types::CorpInfo};

/// Default number of hits returned by a name search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Store of corporation codes, names and listing codes.
///
/// Implementations can keep entries in various backends (SQLite, in-memory,
/// etc.). The metrics pipeline only reads from it.
#[async_trait]
pub trait CorpDirectory: Send + Sync {
    /// Looks up a corporation by its eight digit code.
    ///
    /// Returns `Ok(None)` if the code is unknown.
    async fn find_by_code(&self, corp_code: &str) -> Result<Option<CorpInfo>>;

    /// Searches Korean and English names for a literal, case-insensitive substring.
    ///
    /// The query is trimmed first; an empty query yields no results.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CorpInfo>>;

    /// Replaces all entries. Entries without a corp code are skipped.
    ///
    /// Returns the number of entries stored.
    async fn replace_all(&self, entries: &[CorpInfo]) -> Result<usize>;

    /// Returns the number of stored entries.
    async fn len(&self) -> Result<usize>;

    /// Returns true if the directory has not been seeded.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
