use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of an item's two mod lists a mod belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModClass {
    Implicit,
    Explicit,
}

impl fmt::Display for ModClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModClass::Implicit => write!(f, "implicit"),
            ModClass::Explicit => write!(f, "explicit"),
        }
    }
}

/// Advisory event produced while building or matching.
///
/// Diagnostics describe how a result was reached. They never change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A known wording defect was rewritten during canonicalization
    WordingCorrected {
        item: Option<String>,
        from: String,
        to: String,
    },

    /// More than one perfect cell in one alignment row or column; the greedy
    /// pass picked by scan order
    AmbiguousAlignment {
        item: String,
        variant: String,
        mod_class: ModClass,
        line: String,
    },

    /// No base type is declared for a variant
    MissingBasetype { item: String, variant: String },

    /// No reference entry for this name and base type
    UnknownItem { name: String, basetype: String },

    /// The trailing "Conquered by" line was split off the last explicit
    ConqueredLineSplit { item: String },

    /// A raw mod line was dropped while building the reference
    SkippedLine { item: String, line: String },

    /// A generated unique was left out of the reference
    GeneratedSkipped { item: String },

    /// A configured data patch touched a reference entry
    Patched { item: String, action: String },
}

impl Diagnostic {
    /// Emit through `tracing` at the level this kind warrants
    pub fn log(&self) {
        match self {
            Diagnostic::AmbiguousAlignment { item, variant, mod_class, line } => {
                tracing::warn!(
                    "Ambiguous {} alignment for \"{}\" ({}): \"{}\"",
                    mod_class,
                    item,
                    variant,
                    line
                );
            }
            Diagnostic::MissingBasetype { item, variant } => {
                tracing::warn!("\"{}\" has no base type for variant \"{}\"", item, variant);
            }
            Diagnostic::WordingCorrected { item, from, to } => {
                tracing::info!(
                    "\"{}\" has \"{}\", read as \"{}\"",
                    item.as_deref().unwrap_or("<unknown>"),
                    from,
                    to
                );
            }
            Diagnostic::SkippedLine { item, line } => {
                tracing::info!("{}: skipped \"{}\"", item, line);
            }
            Diagnostic::GeneratedSkipped { item } => {
                tracing::info!("generated skipped: {}", item);
            }
            Diagnostic::Patched { item, action } => {
                tracing::info!("Patched \"{}\": {}", item, action);
            }
            Diagnostic::UnknownItem { name, basetype } => {
                tracing::debug!("No reference entry for \"{}\" ({})", name, basetype);
            }
            Diagnostic::ConqueredLineSplit { item } => {
                tracing::debug!("Split conquered line off \"{}\"", item);
            }
        }
    }
}

/// Ordered collection of diagnostics; recording one also logs it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.0.push(diagnostic);
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Any ambiguity warnings in here?
    pub fn has_ambiguity(&self) -> bool {
        self.0
            .iter()
            .any(|d| matches!(d, Diagnostic::AmbiguousAlignment { .. }))
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
