//! Docfill AI
//!
//! Fuzzy, fallible helpers around an LLM text service. Every operation here
//! has a deterministic fallback, so an unavailable model degrades quality,
//! never function.
//!
//! # Components
//!
//! - [`LlmService`]: `complete` and `stream` over any provider
//! - [`HybridDetector`]: batch field enrichment with cache and fallback
//! - [`IntentClassifier`]: keyword fast path, then a one-word classification
//!
//! # Example
//!
//! ```rust,ignore
//! use docfill_ai::{build_service, EnrichmentCache, HybridDetector, LlmConfig};
//!
//! let detector = HybridDetector::new(build_service(&LlmConfig::default()), EnrichmentCache::default());
//! let fields = detector.detect_fields(parsed.fields, &parsed.text, None).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod detector;
pub mod enrichment;
pub mod error;
pub mod intent;
pub mod llm;

pub use cache::{CacheStats, EnrichmentCache, EnrichmentKey};
pub use detector::{Detection, EnrichmentSource, HybridDetector};
pub use enrichment::{fallback_enrichment, parse_enrichment_response, EnrichmentRecord};
pub use error::{AiResult, AiServiceError};
pub use intent::{fast_path, navigation_target, Intent, IntentClassifier};
pub use llm::{build_service, collect_stream, HttpLlm, LlmConfig, LlmService, NoopLlm, ScriptedLlm};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
