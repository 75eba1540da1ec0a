//! Enrichment cache using moka
//!
//! Enrichment sets are keyed by document type and the sorted set of field
//! placeholders, so two templates of the same kind with the same fields share
//! one LLM call.

use crate::enrichment::EnrichmentRecord;
use docfill_document::DocumentType;
use docfill_model::{ContentHash, Field};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache (approximate)
    pub entry_count: u64,
}

/// Cache key over `(document type, sorted placeholders)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnrichmentKey(ContentHash);

impl EnrichmentKey {
    #[must_use]
    pub fn new(document_type: DocumentType, fields: &[Field]) -> Self {
        let mut names: Vec<&str> = fields.iter().map(|f| f.placeholder.as_str()).collect();
        names.sort_unstable();
        let material = format!("{}\u{1f}{}", document_type, names.join("\u{1f}"));
        Self(ContentHash::fingerprint(material.as_bytes()))
    }
}

/// Shared enrichment cache
///
/// Entries are stored in the field order of the request that produced them.
#[derive(Debug, Clone)]
pub struct EnrichmentCache {
    inner: Cache<EnrichmentKey, Arc<Vec<(String, EnrichmentRecord)>>>,
}

impl EnrichmentCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Store records paired with the placeholders they belong to
    pub async fn insert(&self, key: EnrichmentKey, records: Vec<(String, EnrichmentRecord)>) {
        self.inner.insert(key, Arc::new(records)).await;
    }

    /// Records for `key`, ordered to match `fields`.
    ///
    /// Returns `None` on a miss, or if the stored set does not cover every
    /// requested placeholder.
    pub async fn get(&self, key: &EnrichmentKey, fields: &[Field]) -> Option<Vec<EnrichmentRecord>> {
        let stored = self.inner.get(key).await?;
        fields
            .iter()
            .map(|f| {
                stored
                    .iter()
                    .find(|(name, _)| *name == f.placeholder)
                    .map(|(_, record)| record.clone())
            })
            .collect()
    }

    /// Invalidate cache entry
    #[inline]
    pub async fn invalidate(&self, key: &EnrichmentKey) {
        self.inner.invalidate(key).await;
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for EnrichmentCache {
    /// Cache with default capacity (1,000 entries) and a one-day TTL
    fn default() -> Self {
        Self::with_ttl(1_000, Duration::from_secs(86_400))
    }
}
