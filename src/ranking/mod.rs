pub mod alignment;
pub mod fuzzy;
pub mod match_list;

pub use alignment::{AlignedPair, SimilarityMatrix};
pub use fuzzy::RapidfuzzSimilarity;
pub use match_list::{MismatchReason, ModPair, VariantMatch, VariantMatchList, NO_MATCH_SCORE};

/// Best possible similarity: identical text, every range contained
pub const MAX_SCORE: f64 = 100.0;

/// Trait for text similarity implementations
pub trait TextSimilarity: Send + Sync {
    /// Score two normalized templates, 0.0 - 100.0; identical text scores 100
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Get metric name for logging
    fn name(&self) -> &str;
}
