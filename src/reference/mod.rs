pub mod builder;

use std::path::Path;

use crate::config::{EntryPatch, PatchAction};
use crate::core::{Diagnostic, Diagnostics, ReferenceEntry};
use crate::error::Result;

pub use builder::{BuildOutput, RawLine, RawUniqueItem, ReferenceBuilder};

/// Sorted, read-only collection of reference entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDb {
    entries: Vec<ReferenceEntry>,
}

/// Summary counts for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReferenceStats {
    pub entries: usize,
    pub multi_variant: usize,
    pub multi_basetype: usize,
    pub multi_slot: usize,
}

impl ReferenceDb {
    /// Build from entries in any order. Same-named entries keep their
    /// relative order.
    pub fn new(mut entries: Vec<ReferenceEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    /// Parse a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<ReferenceEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Load a JSON export from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let db = Self::from_json(&text)?;
        tracing::info!(
            "Loaded {} reference entries from {}",
            db.len(),
            path.as_ref().display()
        );
        Ok(db)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sharing `name` (a contiguous run)
    pub fn entries_named(&self, name: &str) -> &[ReferenceEntry] {
        let start = self.entries.partition_point(|e| e.name.as_str() < name);
        let len = self.entries[start..]
            .iter()
            .take_while(|e| e.name == name)
            .count();
        &self.entries[start..start + len]
    }

    /// Entry for this name whose base type (fixed or per-variant) matches
    pub fn find(&self, name: &str, basetype: &str) -> Option<&ReferenceEntry> {
        self.entries_named(name)
            .iter()
            .find(|e| e.has_basetype(basetype))
    }

    /// Apply configured data corrections, reporting each touched entry
    pub fn apply_patches(&mut self, patches: &[EntryPatch]) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for patch in patches {
            let selects = |entry: &ReferenceEntry| {
                entry.name == patch.name
                    && patch
                        .basetype
                        .as_deref()
                        .map_or(true, |b| entry.has_basetype(b))
            };

            match &patch.action {
                PatchAction::Remove => {
                    let before = self.entries.len();
                    self.entries.retain(|e| !selects(e));
                    if self.entries.len() != before {
                        diagnostics.record(Diagnostic::Patched {
                            item: patch.name.clone(),
                            action: "removed".to_string(),
                        });
                    }
                }
                PatchAction::SetBasetype { to } => {
                    for entry in self.entries.iter_mut().filter(|e| selects(e)) {
                        entry.basetype = Some(to.clone());
                        entry.basetypes.clear();
                        diagnostics.record(Diagnostic::Patched {
                            item: entry.name.clone(),
                            action: format!("base type set to \"{}\"", to),
                        });
                    }
                }
                PatchAction::RewriteLine { from, to } => {
                    for entry in self.entries.iter_mut().filter(|e| selects(e)) {
                        let mut rewritten = 0;
                        for generic in entry.implicits.iter_mut().chain(entry.explicits.iter_mut()) {
                            if generic.line == *from {
                                generic.line = to.clone();
                                rewritten += 1;
                            }
                        }
                        if rewritten > 0 {
                            diagnostics.record(Diagnostic::Patched {
                                item: entry.name.clone(),
                                action: format!("rewrote {} \"{}\" line(s)", rewritten, from),
                            });
                        }
                    }
                }
            }
        }

        diagnostics
    }

    pub fn stats(&self) -> ReferenceStats {
        ReferenceStats {
            entries: self.entries.len(),
            multi_variant: self.entries.iter().filter(|e| e.variants.len() > 1).count(),
            multi_basetype: self.entries.iter().filter(|e| e.basetype.is_none()).count(),
            multi_slot: self.entries.iter().filter(|e| e.variant_slots > 1).count(),
        }
    }
}
