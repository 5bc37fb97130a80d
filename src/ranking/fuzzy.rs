use rapidfuzz::distance::indel;

use crate::ranking::{TextSimilarity, MAX_SCORE};

/// Rapidfuzz Indel ratio (the classic `fuzz.ratio`), scaled to 0-100
pub struct RapidfuzzSimilarity;

impl RapidfuzzSimilarity {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RapidfuzzSimilarity {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSimilarity for RapidfuzzSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return MAX_SCORE;
        }

        // Normalized Indel similarity (0.0 - 1.0)
        let score = indel::normalized_similarity(a.chars(), b.chars());

        // Convert to percentage
        (score * MAX_SCORE).clamp(0.0, MAX_SCORE)
    }

    fn name(&self) -> &str {
        "rapidfuzz"
    }
}
