use std::sync::Arc;

use crate::config::{EngineConfig, TextRewrite};
use crate::core::{
    Canonicalizer, Diagnostic, Diagnostics, GenericMod, ItemVariant, ModClass, ObservedItem,
};
use crate::error::{Result, VariantEngineError};
use crate::ranking::{
    MismatchReason, ModPair, RapidfuzzSimilarity, SimilarityMatrix, TextSimilarity,
    VariantMatch, VariantMatchList, MAX_SCORE,
};
use crate::reference::ReferenceDb;

/// Resolve `observed` against `db` with the stock configuration
pub fn resolve(observed: &ObservedItem, db: &ReferenceDb) -> Result<VariantMatchList> {
    VariantEngine::default().resolve(observed, db)
}

/// An observed mod, canonicalized once per lookup
#[derive(Debug, Clone)]
struct PreparedMod {
    text: String,
    generic: GenericMod,
    normalized: String,
}

/// Observed item with both mod lists canonicalized
#[derive(Debug, Clone)]
struct PreparedItem<'a> {
    item: &'a ObservedItem,
    implicits: Vec<PreparedMod>,
    explicits: Vec<PreparedMod>,
}

impl PreparedItem<'_> {
    fn mods(&self, class: ModClass) -> &[PreparedMod] {
        match class {
            ModClass::Implicit => &self.implicits,
            ModClass::Explicit => &self.explicits,
        }
    }
}

/// One mod class aligned against one variant
struct ClassAlignment {
    matrix: SimilarityMatrix,
    pairs: Vec<ModPair>,
    /// Canonical templates in matched order
    observed_lines: Vec<String>,
    reference_lines: Vec<String>,
}

/// Matches observed items against reference entries
pub struct VariantEngine {
    canonicalizer: Canonicalizer,
    synonyms: Vec<TextRewrite>,
    similarity: Arc<dyn TextSimilarity>,
    threshold: f64,
}

impl Default for VariantEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl VariantEngine {
    /// Create an engine with the rapidfuzz similarity metric
    pub fn new(config: &EngineConfig) -> Self {
        let synonyms = config
            .corrections
            .synonyms
            .iter()
            .map(|s| TextRewrite::new(s.from.to_lowercase(), s.to.to_lowercase()))
            .collect();

        Self {
            canonicalizer: Canonicalizer::new(&config.corrections),
            synonyms,
            similarity: Arc::new(RapidfuzzSimilarity::new()),
            threshold: config.threshold,
        }
    }

    /// Swap in another similarity metric
    pub fn with_similarity(mut self, similarity: Arc<dyn TextSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Threshold used by [`VariantEngine::get_variant`]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score `observed` against every variant of its reference entry.
    ///
    /// An item with no reference entry yields an empty list. Fails only when
    /// the reference data is corrupt.
    pub fn resolve(&self, observed: &ObservedItem, db: &ReferenceDb) -> Result<VariantMatchList> {
        let mut diagnostics = Diagnostics::new();

        let mut working = observed.clone();
        if working.split_conquered_line() {
            diagnostics.record(Diagnostic::ConqueredLineSplit {
                item: observed.name.clone(),
            });
        }

        let Some(entry) = db.find(&working.name, &working.base_type) else {
            diagnostics.record(Diagnostic::UnknownItem {
                name: working.name.clone(),
                basetype: working.base_type.clone(),
            });
            let mut list = VariantMatchList::empty(&working.name, &working.base_type);
            list.corrupted = working.corrupted;
            list.synthesised = working.synthesised;
            list.diagnostics = diagnostics;
            return Ok(list);
        };

        let prepared = self.prepare(&working, &mut diagnostics);
        let mut matches = Vec::with_capacity(entry.variants.len());
        for variant in entry.materialize() {
            if variant.basetype.is_empty() {
                diagnostics.record(Diagnostic::MissingBasetype {
                    item: entry.name.clone(),
                    variant: variant.variant_name.to_string(),
                });
            }
            matches.push(self.score_prepared(&prepared, &variant, &mut diagnostics)?);
        }

        let mut list = VariantMatchList::new(matches);
        list.item_name = working.name.clone();
        list.basetype = working.base_type.clone();
        list.variant_slots = entry.variant_slots;
        list.corrupted = working.corrupted;
        list.synthesised = working.synthesised;
        list.diagnostics = diagnostics;

        tracing::debug!(
            "{} ({}): best {:.1} over {} variants",
            list.item_name,
            list.basetype,
            list.best_score(),
            list.len()
        );
        Ok(list)
    }

    /// Variants tied for best at the configured threshold
    pub fn get_variant(&self, observed: &ObservedItem, db: &ReferenceDb) -> Result<Vec<(String, usize)>> {
        Ok(self.resolve(observed, db)?.top(self.threshold))
    }

    /// Score one observed item against one materialized variant.
    ///
    /// `observed` is taken as-is: the conquered-line split is a `resolve` step.
    pub fn score_variant(
        &self,
        observed: &ObservedItem,
        variant: &ItemVariant<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<VariantMatch> {
        let prepared = self.prepare(observed, diagnostics);
        self.score_prepared(&prepared, variant, diagnostics)
    }

    /// Lower-case, collapse line breaks, apply synonyms
    pub fn normalize(&self, template: &str) -> String {
        let mut text = template.to_lowercase().replace("\r\n", " ").replace('\n', " ");
        for synonym in &self.synonyms {
            if text.contains(&synonym.from) {
                text = text.replace(&synonym.from, &synonym.to);
            }
        }
        text
    }

    fn prepare<'a>(&self, item: &'a ObservedItem, diagnostics: &mut Diagnostics) -> PreparedItem<'a> {
        let prepare_class = |lines: &[String], diagnostics: &mut Diagnostics| {
            lines
                .iter()
                .map(|text| {
                    let generic = self.canonicalizer.genericize(text, Some(item.name.as_str()), diagnostics);
                    let normalized = self.normalize(&generic.line);
                    PreparedMod {
                        text: text.clone(),
                        generic,
                        normalized,
                    }
                })
                .collect::<Vec<_>>()
        };

        PreparedItem {
            item,
            implicits: prepare_class(&item.implicit_mods, diagnostics),
            explicits: prepare_class(&item.explicit_mods, diagnostics),
        }
    }

    fn score_prepared(
        &self,
        prepared: &PreparedItem<'_>,
        variant: &ItemVariant<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<VariantMatch> {
        if let Some(reason) = basic_mismatch(prepared.item, variant) {
            tracing::trace!(
                "{} / {}: basic mismatch {:?}",
                variant.item_name,
                variant.variant_name,
                reason
            );
            return Ok(VariantMatch::mismatched(
                variant.variant_name,
                variant.variant_number,
                reason,
            ));
        }

        let implicit = self.align_class(ModClass::Implicit, prepared, variant, diagnostics)?;
        let explicit = self.align_class(ModClass::Explicit, prepared, variant, diagnostics)?;

        let pairs: Vec<ModPair> = implicit.pairs.into_iter().chain(explicit.pairs).collect();
        let scores: Vec<f64> = pairs.iter().map(|p| p.score).collect();

        let minimum_score = scores.iter().copied().reduce(f64::min).unwrap_or(MAX_SCORE);
        let average_score = if scores.is_empty() {
            MAX_SCORE
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let observed_text = implicit
            .observed_lines
            .iter()
            .chain(&explicit.observed_lines)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let reference_text = implicit
            .reference_lines
            .iter()
            .chain(&explicit.reference_lines)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let aggregate_score = self.similarity.similarity(&observed_text, &reference_text);

        Ok(VariantMatch {
            variant_name: variant.variant_name.to_string(),
            variant_number: variant.variant_number,
            mismatch: None,
            implicit_matrix: implicit.matrix,
            explicit_matrix: explicit.matrix,
            pairs,
            minimum_score,
            average_score,
            aggregate_score,
        })
    }

    fn align_class(
        &self,
        class: ModClass,
        prepared: &PreparedItem<'_>,
        variant: &ItemVariant<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ClassAlignment> {
        let observed = prepared.mods(class);
        let reference = variant.mods(class);
        let reference_normalized: Vec<String> =
            reference.iter().map(|m| self.normalize(&m.line)).collect();

        let mut matrix = SimilarityMatrix::new(observed.len(), reference.len());
        for (row, obs) in observed.iter().enumerate() {
            for (col, (generic, normalized)) in reference.iter().zip(&reference_normalized).enumerate() {
                let score = self.cell_score(class, variant.item_name, obs, generic, normalized)?;
                matrix.set(row, col, score);
            }
        }

        let ambiguous_lines = matrix
            .ambiguous_rows()
            .into_iter()
            .map(|row| observed[row].text.clone())
            .chain(
                matrix
                    .ambiguous_cols()
                    .into_iter()
                    .map(|col| reference[col].line.clone()),
            );
        for line in ambiguous_lines {
            diagnostics.record(Diagnostic::AmbiguousAlignment {
                item: variant.item_name.to_string(),
                variant: variant.variant_name.to_string(),
                mod_class: class,
                line,
            });
        }

        let aligned = matrix.greedy_pairs();
        let mut pairs = Vec::with_capacity(aligned.len());
        let mut observed_lines = Vec::with_capacity(aligned.len());
        let mut reference_lines = Vec::with_capacity(aligned.len());
        for pick in aligned {
            pairs.push(ModPair {
                mod_class: class,
                observed: observed[pick.row].text.clone(),
                reference: reference[pick.col].line.clone(),
                score: pick.score,
            });
            observed_lines.push(observed[pick.row].generic.line.clone());
            reference_lines.push(reference[pick.col].line.clone());
        }

        Ok(ClassAlignment {
            matrix,
            pairs,
            observed_lines,
            reference_lines,
        })
    }

    /// 0 unless the normalized templates agree and every observed range is
    /// contained; then the text similarity of the two templates. Agreeing
    /// templates with different placeholder counts mean corrupt reference
    /// data.
    fn cell_score(
        &self,
        class: ModClass,
        item_name: &str,
        observed: &PreparedMod,
        reference: &GenericMod,
        reference_normalized: &str,
    ) -> Result<f64> {
        if observed.normalized != reference_normalized {
            return Ok(0.0);
        }
        if observed.generic.ranges.len() != reference.ranges.len() {
            return Err(VariantEngineError::RangeCountMismatch {
                item: item_name.to_string(),
                mod_class: class,
                observed: observed.text.clone(),
                reference: reference.line.clone(),
                observed_ranges: observed.generic.ranges.len(),
                reference_ranges: reference.ranges.len(),
            });
        }
        if !observed.generic.is_contained_in(reference) {
            return Ok(0.0);
        }

        Ok(self
            .similarity
            .similarity(&observed.normalized, reference_normalized)
            .clamp(0.0, MAX_SCORE))
    }
}

fn basic_mismatch(observed: &ObservedItem, variant: &ItemVariant<'_>) -> Option<MismatchReason> {
    if observed.name != variant.item_name {
        return Some(MismatchReason::Name {
            observed: observed.name.clone(),
            expected: variant.item_name.to_string(),
        });
    }
    if observed.base_type != variant.basetype {
        return Some(MismatchReason::Basetype {
            observed: observed.base_type.clone(),
            expected: variant.basetype.to_string(),
        });
    }
    if observed.implicit_mods.len() != variant.implicits.len() {
        return Some(MismatchReason::ImplicitCount {
            observed: observed.implicit_mods.len(),
            expected: variant.implicits.len(),
        });
    }
    if observed.explicit_mods.len() != variant.explicits.len() {
        return Some(MismatchReason::ExplicitCount {
            observed: observed.explicit_mods.len(),
            expected: variant.explicits.len(),
        });
    }
    None
}
