use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{Corrections, TextRewrite};
use crate::core::diagnostic::{Diagnostic, Diagnostics};

/// Stands in for every number or number range in a template
pub const PLACEHOLDER: &str = "#";

/// Inclusive `[low, high]` bounds for one placeholder
pub type Range = [f64; 2];

/// A bare signed decimal, or a parenthesized range with an optional leading
/// sign that applies to both ends.
static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<sign>-?)\((?P<start>-?[0-9]+\.?[0-9]*)-(?P<end>-?[0-9]+\.?[0-9]*)\)|(?P<single>-?[0-9]+\.?[0-9]*)",
    )
    .expect("number token pattern is valid")
});

static DEFAULT_CANONICALIZER: Lazy<Canonicalizer> = Lazy::new(Canonicalizer::default);

fn is_false(value: &bool) -> bool {
    !*value
}

/// A mod with its numbers pulled out.
///
/// `line` is the mod text with every number and number range replaced by
/// `#`; `ranges` holds one `[low, high]` per `#`, left to right. A single
/// number gives `low == high`.
///
/// The (fictional) mod "(1-2) to (4-6) Added Cold Damage per 10 Dexterity"
/// becomes `line = "# to # Added Cold Damage per # Dexterity"` with
/// `ranges = [[1, 2], [4, 6], [10, 10]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMod {
    pub line: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,

    /// Variant indices this mod appears on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<usize>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub crafted: bool,
}

impl GenericMod {
    /// Template with known ranges, not tied to any variant
    pub fn new(line: impl Into<String>, ranges: Vec<Range>) -> Self {
        Self {
            line: line.into(),
            ranges,
            variants: Vec::new(),
            crafted: false,
        }
    }

    pub fn with_variants(mut self, variants: Vec<usize>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_crafted(mut self, crafted: bool) -> Self {
        self.crafted = crafted;
        self
    }

    /// Does this mod appear on variant `index`?
    pub fn applies_to(&self, index: usize) -> bool {
        self.variants.contains(&index)
    }

    /// Every range of `self` lies inside the matching range of `other`.
    ///
    /// Callers must check the range counts agree first.
    pub fn is_contained_in(&self, other: &GenericMod) -> bool {
        self.ranges
            .iter()
            .zip(&other.ranges)
            .all(|(inner, outer)| inner[0] >= outer[0] && inner[1] <= outer[1])
    }
}

/// Canonicalize mod text with the stock corrections.
///
/// Works on both reference text ("+(20-30) to Strength") and rolled text
/// ("+25 to Strength"); both give the template "+# to Strength".
///
/// ```
/// use unique_variant_engine::genericize;
///
/// let generic = genericize("-(20-10)% to Chaos Resistance");
/// assert_eq!(generic.line, "#% to Chaos Resistance");
/// assert_eq!(generic.ranges, vec![[-20.0, -10.0]]);
/// ```
pub fn genericize(text: &str) -> GenericMod {
    DEFAULT_CANONICALIZER.genericize(text, None, &mut Diagnostics::new())
}

/// Turns literal mod text into [`GenericMod`]s
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    rewrites: Vec<TextRewrite>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(&Corrections::default())
    }
}

impl Canonicalizer {
    pub fn new(corrections: &Corrections) -> Self {
        Self {
            rewrites: corrections.line_rewrites.clone(),
        }
    }

    /// Canonicalize `text`. `item_name` only labels diagnostics.
    pub fn genericize(
        &self,
        text: &str,
        item_name: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> GenericMod {
        let mut ranges = Vec::new();
        let mut line = String::with_capacity(text.len());
        let mut last = 0;

        for caps in NUMBER_TOKEN.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            line.push_str(&text[last..whole.start()]);
            line.push_str(PLACEHOLDER);
            last = whole.end();

            if let Some(single) = caps.name("single") {
                let n = parse_number(single.as_str());
                ranges.push([n, n]);
            } else {
                let mut start = caps.name("start").map_or(0.0, |m| parse_number(m.as_str()));
                let mut end = caps.name("end").map_or(0.0, |m| parse_number(m.as_str()));
                if caps.name("sign").is_some_and(|m| m.as_str() == "-") {
                    start = -start;
                    end = -end;
                }
                ranges.push([start.min(end), start.max(end)]);
            }
        }
        line.push_str(&text[last..]);

        for rewrite in &self.rewrites {
            if line.contains(&rewrite.from) {
                diagnostics.record(Diagnostic::WordingCorrected {
                    item: item_name.map(str::to_string),
                    from: rewrite.from.clone(),
                    to: rewrite.to.clone(),
                });
                line = line.replace(&rewrite.from, &rewrite.to);
            }
        }

        GenericMod::new(line, ranges)
    }
}

// The token pattern only admits ASCII decimal literals, which always parse.
fn parse_number(text: &str) -> f64 {
    text.parse().unwrap_or_default()
}
