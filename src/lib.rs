//! # Unique Variant Engine
//!
//! Works out which historical version of a unique item a concrete item is:
//! - Mod canonicalization (numbers and ranges → `#` templates)
//! - Reference database of every variant an item has had
//! - Range containment plus fuzzy template similarity per mod
//! - Greedy one-to-one mod alignment and ranked variant lists
//! - Multiple interfaces: Rust library, Python bindings, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use unique_variant_engine::{resolve, ObservedItem, ReferenceDb};
//!
//! fn main() -> anyhow::Result<()> {
//!     let db = ReferenceDb::load("pob_export.json")?;
//!
//!     let item = ObservedItem::new("Marohi Erqi", "Karui Maul")
//!         .with_explicits(["220% increased Physical Damage"]);
//!
//!     let matches = resolve(&item, &db)?;
//!     for (variant, index) in matches.top(100.0) {
//!         println!("{} is variant {} ({})", item.name, variant, index);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod reference;

// Re-export primary types
pub use config::{Corrections, EngineConfig, EntryPatch, PatchAction, TextRewrite, DEFAULT_THRESHOLD};
pub use core::{
    genericize, Canonicalizer, Diagnostic, Diagnostics, GenericMod, ItemVariant, ModClass,
    ObservedItem, ReferenceEntry,
};
pub use engine::{resolve, VariantEngine};
pub use error::{Result, VariantEngineError};
pub use ranking::{MismatchReason, TextSimilarity, VariantMatch, VariantMatchList, NO_MATCH_SCORE};
pub use reference::{ReferenceBuilder, ReferenceDb, ReferenceStats};

// Python bindings
#[cfg(feature = "python")]
pub mod python;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_top_level_genericize() {
        let generic = genericize("Adds (10-15) to (20-25) Fire Damage");
        assert_eq!(generic.line, "Adds # to # Fire Damage");
        assert_eq!(generic.ranges, vec![[10.0, 15.0], [20.0, 25.0]]);
    }
}
