use serde::{Deserialize, Serialize};

use crate::core::diagnostic::ModClass;
use crate::core::generic_mod::GenericMod;

fn default_variant_slots() -> u8 {
    1
}

fn is_single_slot(slots: &u8) -> bool {
    *slots == 1
}

/// Base type used by a subset of an item's variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTypeVariant {
    pub basetype: String,
    pub variants: Vec<usize>,
}

/// Upgrade into another unique via a currency item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePath {
    pub dest: String,
    pub currency: String,
}

/// Structured upgrade path, or the raw text when it didn't parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Upgrade {
    Path(UpgradePath),
    Text(String),
}

/// Full historical record of one unique item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,

    /// Set when every variant shares one base type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basetype: Option<String>,

    /// Set when the base type changed between variants
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub basetypes: Vec<BaseTypeVariant>,

    #[serde(default)]
    pub itemclass: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub league: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<Upgrade>,

    /// Variant labels; the position is the variant index
    pub variants: Vec<String>,

    #[serde(default)]
    pub implicits: Vec<GenericMod>,

    #[serde(default)]
    pub explicits: Vec<GenericMod>,

    /// Independent variant dimensions (alternate selectors in the source)
    #[serde(
        default = "default_variant_slots",
        skip_serializing_if = "is_single_slot"
    )]
    pub variant_slots: u8,
}

impl ReferenceEntry {
    /// Entry with a single fixed base type and no mods yet
    pub fn new(
        name: impl Into<String>,
        basetype: impl Into<String>,
        variants: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            basetype: Some(basetype.into()),
            basetypes: Vec::new(),
            itemclass: String::new(),
            source: String::new(),
            league: String::new(),
            upgrade: None,
            variants,
            implicits: Vec::new(),
            explicits: Vec::new(),
            variant_slots: 1,
        }
    }

    /// Can an item with this base type be this entry?
    pub fn has_basetype(&self, basetype: &str) -> bool {
        match &self.basetype {
            Some(fixed) => fixed == basetype,
            None => self.basetypes.iter().any(|b| b.basetype == basetype),
        }
    }

    /// Base type of variant `index`, if one is declared
    pub fn basetype_for(&self, index: usize) -> Option<&str> {
        if let Some(fixed) = &self.basetype {
            return Some(fixed.as_str());
        }
        self.basetypes
            .iter()
            .find(|b| b.variants.contains(&index))
            .map(|b| b.basetype.as_str())
    }

    /// Expand into one fully-hydrated variant per label, in label order.
    ///
    /// A variant with no declared base type gets `""`; that is a gap in the
    /// reference data, not an error.
    pub fn materialize(&self) -> Vec<ItemVariant<'_>> {
        self.variants
            .iter()
            .enumerate()
            .map(|(index, variant_name)| ItemVariant {
                item_name: self.name.as_str(),
                basetype: self.basetype_for(index).unwrap_or(""),
                variant_name: variant_name.as_str(),
                variant_number: index,
                implicits: self.implicits.iter().filter(|m| m.applies_to(index)).collect(),
                explicits: self.explicits.iter().filter(|m| m.applies_to(index)).collect(),
            })
            .collect()
    }
}

/// One variant of a reference entry with only its own mods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemVariant<'a> {
    pub item_name: &'a str,
    pub basetype: &'a str,
    pub variant_name: &'a str,
    pub variant_number: usize,
    pub implicits: Vec<&'a GenericMod>,
    pub explicits: Vec<&'a GenericMod>,
}

impl<'a> ItemVariant<'a> {
    pub fn mods(&self, class: ModClass) -> &[&'a GenericMod] {
        match class {
            ModClass::Implicit => &self.implicits,
            ModClass::Explicit => &self.explicits,
        }
    }
}
