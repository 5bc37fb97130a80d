use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::DEFAULT_THRESHOLD;
use crate::core::{Diagnostics, ModClass};
use crate::ranking::SimilarityMatrix;

/// `best_score()` of a list with no variants
pub const NO_MATCH_SCORE: f64 = -1.0;

/// Why a variant was ruled out without looking at mod text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MismatchReason {
    Name { observed: String, expected: String },
    Basetype { observed: String, expected: String },
    ImplicitCount { observed: usize, expected: usize },
    ExplicitCount { observed: usize, expected: usize },
}

/// One observed mod aligned with one reference mod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModPair {
    pub mod_class: ModClass,
    /// Observed text as reported
    pub observed: String,
    /// Reference template
    pub reference: String,
    pub score: f64,
}

/// Result of scoring one observed item against one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMatch {
    pub variant_name: String,
    pub variant_number: usize,

    /// Set when name, base type or mod counts rule the variant out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<MismatchReason>,

    pub implicit_matrix: SimilarityMatrix,
    pub explicit_matrix: SimilarityMatrix,

    /// Greedy alignment, implicits first
    pub pairs: Vec<ModPair>,

    /// Weakest pair; the ranking key
    pub minimum_score: f64,
    pub average_score: f64,

    /// Whole-text similarity of the aligned lines, informational only
    pub aggregate_score: f64,
}

impl VariantMatch {
    /// Variant ruled out structurally; every score is 0
    pub fn mismatched(
        variant_name: impl Into<String>,
        variant_number: usize,
        reason: MismatchReason,
    ) -> Self {
        Self {
            variant_name: variant_name.into(),
            variant_number,
            mismatch: Some(reason),
            implicit_matrix: SimilarityMatrix::default(),
            explicit_matrix: SimilarityMatrix::default(),
            pairs: Vec::new(),
            minimum_score: 0.0,
            average_score: 0.0,
            aggregate_score: 0.0,
        }
    }

    pub fn basic_mismatch(&self) -> bool {
        self.mismatch.is_some()
    }

    /// `(variant_name, variant_number)`
    pub fn id(&self) -> (String, usize) {
        (self.variant_name.clone(), self.variant_number)
    }

    fn eligible(&self, threshold: f64) -> bool {
        !self.basic_mismatch() && self.minimum_score >= threshold
    }
}

/// Every variant of one reference entry scored against one observed item,
/// best first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantMatchList {
    pub item_name: String,
    pub basetype: String,

    /// Independent variant dimensions of the matched entry
    pub variant_slots: u8,

    pub corrupted: bool,
    pub synthesised: bool,

    matches: Vec<VariantMatch>,

    pub diagnostics: Diagnostics,
}

impl VariantMatchList {
    /// Sort `matches` by descending minimum score. Structural mismatches go
    /// after scored variants with the same score; otherwise variant order is
    /// kept.
    pub fn new(mut matches: Vec<VariantMatch>) -> Self {
        matches.sort_by(|a, b| {
            b.minimum_score
                .partial_cmp(&a.minimum_score)
                .unwrap_or(Ordering::Equal)
                .then(a.basic_mismatch().cmp(&b.basic_mismatch()))
        });
        Self {
            variant_slots: 1,
            matches,
            ..Default::default()
        }
    }

    /// Empty result for an item with no reference entry
    pub fn empty(item_name: impl Into<String>, basetype: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            basetype: basetype.into(),
            ..Self::new(Vec::new())
        }
    }

    pub fn matches(&self) -> &[VariantMatch] {
        &self.matches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantMatch> {
        self.matches.iter()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Minimum score of the top entry, `NO_MATCH_SCORE` when empty
    pub fn best_score(&self) -> f64 {
        self.matches
            .first()
            .map_or(NO_MATCH_SCORE, |m| m.minimum_score)
    }

    /// The matches tied for best, if the best reaches `threshold`
    pub fn top_matches(&self, threshold: f64) -> &[VariantMatch] {
        let best = self.best_score();
        if self.matches.is_empty() || best < threshold {
            return &[];
        }
        let tied = self
            .matches
            .iter()
            .take_while(|m| m.minimum_score == best && !m.basic_mismatch())
            .count();
        &self.matches[..tied]
    }

    /// `(variant_name, variant_number)` of the variants tied for best, if the
    /// best reaches `threshold`
    pub fn top(&self, threshold: f64) -> Vec<(String, usize)> {
        self.top_matches(threshold).iter().map(VariantMatch::id).collect()
    }

    /// `top` at the default threshold: only perfect matches
    pub fn perfect(&self) -> Vec<(String, usize)> {
        self.top(DEFAULT_THRESHOLD)
    }

    /// Every variant at or above `threshold`
    pub fn filter(&self, threshold: f64) -> Vec<(String, usize)> {
        self.matches
            .iter()
            .filter(|m| m.eligible(threshold))
            .map(VariantMatch::id)
            .collect()
    }

    /// Known item, no perfect variant, and nothing (corruption, synthesis,
    /// a second variant slot) that would explain it
    pub fn needs_review(&self) -> bool {
        !self.matches.is_empty()
            && self.perfect().is_empty()
            && !self.corrupted
            && !self.synthesised
            && self.variant_slots == 1
    }
}

impl<'a> IntoIterator for &'a VariantMatchList {
    type Item = &'a VariantMatch;
    type IntoIter = std::slice::Iter<'a, VariantMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(name: &str, number: usize, minimum: f64) -> VariantMatch {
        VariantMatch {
            variant_name: name.to_string(),
            variant_number: number,
            mismatch: None,
            implicit_matrix: SimilarityMatrix::default(),
            explicit_matrix: SimilarityMatrix::default(),
            pairs: Vec::new(),
            minimum_score: minimum,
            average_score: minimum,
            aggregate_score: minimum,
        }
    }

    fn mismatched(name: &str, number: usize) -> VariantMatch {
        VariantMatch::mismatched(
            name,
            number,
            MismatchReason::ExplicitCount {
                observed: 3,
                expected: 4,
            },
        )
    }

    #[test]
    fn test_sorted_descending() {
        let list = VariantMatchList::new(vec![
            scored("Pre 3.0.0", 0, 40.0),
            mismatched("Pre 3.5.0", 1),
            scored("Pre 3.10.0", 2, 100.0),
            scored("Current", 3, 0.0),
            scored("Legacy", 4, 87.5),
        ]);

        for pair in list.matches().windows(2) {
            assert!(pair[0].minimum_score >= pair[1].minimum_score);
        }
        // scored zero ahead of structural mismatch
        assert_eq!(list.matches()[3].variant_name, "Current");
        assert!(list.matches()[4].basic_mismatch());
        assert_eq!(list.best_score(), 100.0);
    }

    #[test]
    fn test_top_returns_ties() {
        let list = VariantMatchList::new(vec![
            scored("Pre 0.11.6d", 0, 100.0),
            scored("Current", 1, 100.0),
            scored("Pre 3.0.0", 2, 50.0),
        ]);
        assert_eq!(
            list.top(100.0),
            vec![("Pre 0.11.6d".to_string(), 0), ("Current".to_string(), 1)]
        );
        assert_eq!(list.perfect(), list.top(100.0));
    }

    #[test]
    fn test_top_respects_threshold() {
        let list = VariantMatchList::new(vec![scored("Current", 1, 92.0), scored("Old", 0, 60.0)]);
        assert!(list.top(100.0).is_empty());
        assert_eq!(list.top(90.0), vec![("Current".to_string(), 1)]);
        assert_eq!(list.filter(50.0).len(), 2);
        assert_eq!(list.filter(61.0), vec![("Current".to_string(), 1)]);
    }

    #[test]
    fn test_mismatches_never_returned() {
        let list = VariantMatchList::new(vec![mismatched("A", 0), mismatched("B", 1)]);
        assert_eq!(list.best_score(), 0.0);
        assert!(list.top(0.0).is_empty());
        assert!(list.filter(0.0).is_empty());
    }

    #[test]
    fn test_empty_list() {
        let list = VariantMatchList::empty("Mageblood", "Heavy Belt");
        assert!(list.is_empty());
        assert_eq!(list.best_score(), NO_MATCH_SCORE);
        assert!(list.top(0.0).is_empty());
        assert!(list.filter(NO_MATCH_SCORE).is_empty());
        assert!(!list.needs_review());
    }

    #[test]
    fn test_needs_review() {
        let mut list = VariantMatchList::new(vec![scored("Current", 0, 50.0)]);
        assert!(list.needs_review());

        list.corrupted = true;
        assert!(!list.needs_review());

        list.corrupted = false;
        list.variant_slots = 2;
        assert!(!list.needs_review());

        let resolved = VariantMatchList::new(vec![scored("Current", 0, 100.0)]);
        assert!(!resolved.needs_review());
    }
}
