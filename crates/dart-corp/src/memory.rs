//! In-memory directory implementation.

use async_trait::async_trait;
use dart_core::{CorpDirectory, CorpInfo, Result};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory corporation directory for testing and development.
///
/// Entries are stored in an `RwLock`-protected `Vec` in seeding order and
/// are lost when the directory is dropped.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entries: RwLock<Vec<CorpInfo>>,
}

impl InMemoryDirectory {
    /// Create a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding the given entries.
    #[must_use]
    pub fn with_entries(entries: &[CorpInfo]) -> Self {
        Self {
            entries: RwLock::new(dedupe(entries)),
        }
    }
}

/// Drops entries without a corp code and keeps the last entry per code.
///
/// A replaced entry takes the position of its last occurrence.
fn dedupe(entries: &[CorpInfo]) -> Vec<CorpInfo> {
    let mut seen = HashSet::new();
    let mut kept: Vec<CorpInfo> = entries
        .iter()
        .rev()
        .filter(|e| !e.corp_code.is_empty() && seen.insert(e.corp_code.as_str()))
        .cloned()
        .collect();
    kept.reverse();
    kept
}

#[async_trait]
impl CorpDirectory for InMemoryDirectory {
    #[instrument(skip(self))]
    async fn find_by_code(&self, corp_code: &str) -> Result<Option<CorpInfo>> {
        let entries = self.entries.read().await;
        let found = entries.iter().find(|e| e.corp_code == corp_code).cloned();
        debug!(found = found.is_some(), "Directory lookup");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CorpInfo>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        let hits: Vec<CorpInfo> = entries
            .iter()
            .filter(|e| e.matches_lowercase(&needle))
            .take(limit)
            .cloned()
            .collect();
        debug!(hits = hits.len(), "Directory search");
        Ok(hits)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn replace_all(&self, entries: &[CorpInfo]) -> Result<usize> {
        let kept = dedupe(entries);
        let stored = kept.len();
        *self.entries.write().await = kept;
        debug!(stored, "Directory replaced");
        Ok(stored)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dart_core::DEFAULT_SEARCH_LIMIT;

    fn sample() -> Vec<CorpInfo> {
        vec![
            CorpInfo::new("00126380", "삼성전자")
                .with_eng_name("SAMSUNG ELECTRONICS CO,.LTD")
                .with_stock_code("005930"),
            CorpInfo::new("00164779", "SK하이닉스")
                .with_eng_name("SK hynix Inc.")
                .with_stock_code("000660"),
            CorpInfo::new("00149655", "삼성물산").with_eng_name("SAMSUNG C&T CORPORATION"),
            CorpInfo::new("", "코드없음"),
        ]
    }

    #[tokio::test]
    async fn test_replace_all_skips_blank_codes() {
        let dir = InMemoryDirectory::new();
        assert!(dir.is_empty().await.unwrap());

        let stored = dir.replace_all(&sample()).await.unwrap();
        assert_eq!(stored, 3);
        assert_eq!(dir.len().await.unwrap(), 3);

        // Reseeding replaces rather than appends
        let stored = dir.replace_all(&sample()[..1]).await.unwrap();
        assert_eq!(stored, 1);
        assert_eq!(dir.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let dir = InMemoryDirectory::with_entries(&sample());
        let hit = dir.find_by_code("00164779").await.unwrap().unwrap();
        assert_eq!(hit.corp_name, "SK하이닉스");
        assert!(dir.find_by_code("99999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_korean_and_english_names() {
        let dir = InMemoryDirectory::with_entries(&sample());

        let hits = dir.search("삼성", DEFAULT_SEARCH_LIMIT).await.unwrap();
        let codes: Vec<&str> = hits.iter().map(|h| h.corp_code.as_str()).collect();
        assert_eq!(codes, vec!["00126380", "00149655"]);

        let hits = dir.search("  HYNIX ", DEFAULT_SEARCH_LIMIT).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].corp_code, "00164779");
    }

    #[tokio::test]
    async fn test_search_is_literal() {
        let dir = InMemoryDirectory::with_entries(&sample());
        assert_eq!(dir.search("c&t", 20).await.unwrap().len(), 1);
        assert!(dir.search(".*", 20).await.unwrap().is_empty());
        assert!(dir.search("(", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_query_and_limit() {
        let dir = InMemoryDirectory::with_entries(&sample());
        assert!(dir.search("   ", 20).await.unwrap().is_empty());
        assert_eq!(dir.search("samsung", 1).await.unwrap().len(), 1);
    }

    #[test]
    fn test_dedupe_keeps_last_entry() {
        let entries = vec![
            CorpInfo::new("1", "old"),
            CorpInfo::new("2", "other"),
            CorpInfo::new("1", "new"),
        ];
        let kept = dedupe(&entries);
        let names: Vec<&str> = kept.iter().map(|e| e.corp_name.as_str()).collect();
        assert_eq!(names, vec!["other", "new"]);
    }
}
