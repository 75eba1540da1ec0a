//! Hybrid field detector
//!
//! Parser output is authoritative for membership and order; the detector only
//! attaches metadata. Resolution order for each batch:
//! 1. Enrichment cache (confidence 0.99)
//! 2. One LLM call for all fields (confidence 0.85)
//! 3. Deterministic fallback by field type (confidence 0.5)
//!
//! Steps 2 and 3 are cached alike.

use crate::cache::{EnrichmentCache, EnrichmentKey};
use crate::enrichment::{
    apply_enrichment, build_enrichment_prompt, fallback_enrichment, parse_enrichment_response,
    EnrichmentRecord, ENRICHMENT_SYSTEM_PROMPT,
};
use crate::llm::LlmService;
use docfill_document::{detect_document_type, DocumentType};
use docfill_model::Field;
use std::sync::Arc;

pub const CACHED_CONFIDENCE: f64 = 0.99;
pub const LLM_CONFIDENCE: f64 = 0.85;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Where a batch of enrichments came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentSource {
    Cache,
    Llm,
    Fallback,
}

/// Enriched fields plus provenance
#[derive(Debug, Clone)]
pub struct Detection {
    pub fields: Vec<Field>,
    pub source: EnrichmentSource,
    pub document_type: DocumentType,
}

/// LLM-backed enrichment with cache and deterministic fallback
#[derive(Clone)]
pub struct HybridDetector {
    llm: Arc<dyn LlmService>,
    cache: EnrichmentCache,
}

impl std::fmt::Debug for HybridDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridDetector")
            .field("llm", &self.llm.name())
            .field("cache", &self.cache.stats())
            .finish()
    }
}

impl HybridDetector {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmService>, cache: EnrichmentCache) -> Self {
        Self { llm, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &EnrichmentCache {
        &self.cache
    }

    /// Enrich `fields`. Never fails and never adds, removes or reorders fields.
    pub async fn detect_fields(
        &self,
        fields: Vec<Field>,
        document_text: &str,
        document_type: Option<DocumentType>,
    ) -> Vec<Field> {
        self.detect(fields, document_text, document_type).await.fields
    }

    /// Like [`HybridDetector::detect_fields`], also reporting provenance
    pub async fn detect(
        &self,
        mut fields: Vec<Field>,
        document_text: &str,
        document_type: Option<DocumentType>,
    ) -> Detection {
        let document_type = document_type.unwrap_or_else(|| detect_document_type(document_text));
        if fields.is_empty() {
            return Detection {
                fields,
                source: EnrichmentSource::Fallback,
                document_type,
            };
        }

        let key = EnrichmentKey::new(document_type, &fields);
        if let Some(records) = self.cache.get(&key, &fields).await {
            tracing::debug!(cache_hit = true, fields = fields.len(), "applying cached enrichment");
            apply_all(&mut fields, &records, CACHED_CONFIDENCE);
            return Detection {
                fields,
                source: EnrichmentSource::Cache,
                document_type,
            };
        }

        let prompt = build_enrichment_prompt(&fields, document_text, document_type);
        let outcome = match self.llm.complete(&prompt, Some(ENRICHMENT_SYSTEM_PROMPT)).await {
            Ok(response) => parse_enrichment_response(&response, fields.len()),
            Err(err) => Err(err),
        };

        let (records, source, confidence) = match outcome {
            Ok(records) => (records, EnrichmentSource::Llm, LLM_CONFIDENCE),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    provider = self.llm.name(),
                    fields = fields.len(),
                    "enrichment degraded to fallback"
                );
                let records = fields.iter().map(fallback_enrichment).collect();
                (records, EnrichmentSource::Fallback, FALLBACK_CONFIDENCE)
            }
        };

        let entry = fields
            .iter()
            .zip(&records)
            .map(|(f, r)| (f.placeholder.clone(), r.clone()))
            .collect();
        self.cache.insert(key, entry).await;

        tracing::info!(
            cache_hit = false,
            source = ?source,
            document_type = %document_type,
            fields = fields.len(),
            "enriched fields"
        );
        apply_all(&mut fields, &records, confidence);
        Detection {
            fields,
            source,
            document_type,
        }
    }
}

/// Index-aligned application
fn apply_all(fields: &mut [Field], records: &[EnrichmentRecord], confidence: f64) {
    for (field, record) in fields.iter_mut().zip(records) {
        apply_enrichment(field, record, confidence);
    }
}
