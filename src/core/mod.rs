pub mod diagnostic;
pub mod generic_mod;
pub mod observed_item;
pub mod reference_entry;

pub use diagnostic::{Diagnostic, Diagnostics, ModClass};
pub use generic_mod::{genericize, Canonicalizer, GenericMod, Range, PLACEHOLDER};
pub use observed_item::{ObservedItem, CONQUERED_PREFIX};
pub use reference_entry::{BaseTypeVariant, ItemVariant, ReferenceEntry, Upgrade, UpgradePath};
