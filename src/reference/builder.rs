use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::EntryPatch;
use crate::core::{
    BaseTypeVariant, Canonicalizer, Diagnostic, Diagnostics, GenericMod, ReferenceEntry, Upgrade,
    UpgradePath,
};
use crate::error::{Result, VariantEngineError};
use crate::reference::ReferenceDb;

/// Label given to items that declare no variants
pub const SOLE_VARIANT: &str = "Only";

const LEVEL_REQ_PREFIX: &str = "LevelReq: ";
const ANOINT_LINE: &str = "This item can be anointed by Cassia";

static UPGRADE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Upgrades to unique\{(.+?)\} (?:using|via) currency\{(.+?)\}$")
        .expect("upgrade pattern is valid")
});

/// One line of a raw unique item (base line or mod line)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLine {
    pub line: String,

    /// 1-based variant numbers; empty means every variant
    #[serde(default)]
    pub variant_list: Vec<usize>,

    #[serde(default)]
    pub crafted: bool,
}

impl RawLine {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ..Default::default()
        }
    }

    pub fn on_variants(mut self, variants: impl IntoIterator<Item = usize>) -> Self {
        self.variant_list = variants.into_iter().collect();
        self
    }

    /// 0-based variant indices this line applies to
    fn variant_indices(&self, item: &str, count: usize) -> Result<Vec<usize>> {
        if self.variant_list.is_empty() {
            return Ok((0..count).collect());
        }
        self.variant_list
            .iter()
            .map(|&n| {
                if n == 0 || n > count {
                    Err(VariantEngineError::InvalidVariantIndex {
                        item: item.to_string(),
                        index: n,
                        count,
                    })
                } else {
                    Ok(n - 1)
                }
            })
            .collect()
    }
}

/// A unique item as dumped from the build planner's database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUniqueItem {
    pub title: String,

    pub base_name: String,

    #[serde(rename = "type", default)]
    pub item_type: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub league: String,

    #[serde(default)]
    pub variant_list: Vec<String>,

    /// Number of alternate variant selectors
    #[serde(default)]
    pub variant_alts: u8,

    #[serde(default)]
    pub base_lines: Vec<RawLine>,

    #[serde(default)]
    pub implicit_mod_lines: Vec<RawLine>,

    #[serde(default)]
    pub explicit_mod_lines: Vec<RawLine>,

    #[serde(default)]
    pub upgrade_paths: Vec<String>,
}

/// Reference database plus everything noticed while building it
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub db: ReferenceDb,
    pub diagnostics: Diagnostics,
}

impl BuildOutput {
    /// Apply data patches to the fresh database, keeping their diagnostics
    /// with the build's own
    pub fn apply_patches(&mut self, patches: &[EntryPatch]) {
        let patched = self.db.apply_patches(patches);
        self.diagnostics.append(patched);
    }
}

/// Converts raw unique items into reference entries
#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    canonicalizer: Canonicalizer,
    generated: HashSet<String>,
}

impl ReferenceBuilder {
    pub fn new(canonicalizer: Canonicalizer) -> Self {
        Self {
            canonicalizer,
            generated: HashSet::new(),
        }
    }

    /// Names of generated uniques to leave out
    pub fn skip_generated<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.generated.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build a sorted reference database
    pub fn build(&self, raw_items: &[RawUniqueItem]) -> Result<BuildOutput> {
        let mut diagnostics = Diagnostics::new();
        let mut entries = Vec::with_capacity(raw_items.len());

        for raw in raw_items {
            if self.generated.contains(&raw.title) {
                diagnostics.record(Diagnostic::GeneratedSkipped {
                    item: raw.title.clone(),
                });
                continue;
            }
            entries.push(self.build_entry(raw, &mut diagnostics)?);
        }

        let db = ReferenceDb::new(entries);
        tracing::info!(
            "Built {} reference entries ({} diagnostics)",
            db.len(),
            diagnostics.len()
        );
        Ok(BuildOutput { db, diagnostics })
    }

    /// Convert a single raw item
    pub fn build_entry(
        &self,
        raw: &RawUniqueItem,
        diagnostics: &mut Diagnostics,
    ) -> Result<ReferenceEntry> {
        let name = raw.title.as_str();
        let variants = if raw.variant_list.is_empty() {
            vec![SOLE_VARIANT.to_string()]
        } else {
            raw.variant_list.clone()
        };
        let count = variants.len();

        let mut basetypes = raw
            .base_lines
            .iter()
            .map(|b| {
                Ok(BaseTypeVariant {
                    basetype: b.line.clone(),
                    variants: b.variant_indices(name, count)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let basetype = if basetypes.len() <= 1 {
            basetypes.clear();
            Some(raw.base_name.clone())
        } else {
            None
        };

        let implicits = self.build_mods(name, &raw.implicit_mod_lines, count, diagnostics)?;
        let explicits = self.build_mods(name, &raw.explicit_mod_lines, count, diagnostics)?;

        let upgrade = match raw.upgrade_paths.as_slice() {
            [] => None,
            [text] => Some(parse_upgrade(text)),
            paths => {
                return Err(VariantEngineError::MultipleUpgradePaths {
                    item: name.to_string(),
                    count: paths.len(),
                })
            }
        };

        Ok(ReferenceEntry {
            name: name.to_string(),
            basetype,
            basetypes,
            itemclass: raw.item_type.clone(),
            source: raw.source.clone(),
            league: raw.league.clone(),
            upgrade,
            variants,
            implicits,
            explicits,
            variant_slots: raw.variant_alts.saturating_add(1),
        })
    }

    fn build_mods(
        &self,
        name: &str,
        lines: &[RawLine],
        count: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<GenericMod>> {
        let mut mods = Vec::with_capacity(lines.len());
        for raw in lines {
            let generic = self
                .canonicalizer
                .genericize(&raw.line, Some(name), diagnostics);

            if generic.line.starts_with(LEVEL_REQ_PREFIX) || generic.line == ANOINT_LINE {
                diagnostics.record(Diagnostic::SkippedLine {
                    item: name.to_string(),
                    line: raw.line.clone(),
                });
                continue;
            }

            mods.push(
                generic
                    .with_variants(raw.variant_indices(name, count)?)
                    .with_crafted(raw.crafted),
            );
        }
        Ok(mods)
    }
}

fn parse_upgrade(text: &str) -> Upgrade {
    match UPGRADE_PATTERN.captures(text) {
        Some(caps) => Upgrade::Path(UpgradePath {
            dest: caps[1].to_string(),
            currency: caps[2].to_string(),
        }),
        None => Upgrade::Text(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marohi_erqi() -> RawUniqueItem {
        RawUniqueItem {
            title: "Marohi Erqi".to_string(),
            base_name: "Karui Maul".to_string(),
            item_type: "Two Handed Mace".to_string(),
            variant_list: vec!["Pre 2.6.0".to_string(), "Current".to_string()],
            base_lines: vec![RawLine::new("Karui Maul")],
            explicit_mod_lines: vec![
                RawLine::new("LevelReq: 57"),
                RawLine::new("(200-250)% increased Physical Damage").on_variants([1]),
                RawLine::new("(250-300)% increased Physical Damage").on_variants([2]),
                RawLine::new("10% reduced Attack Speed"),
                RawLine::new("(20-25)% increased Area of Effect of Area Skills"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_entry() {
        let builder = ReferenceBuilder::default();
        let mut diagnostics = Diagnostics::new();
        let entry = builder.build_entry(&marohi_erqi(), &mut diagnostics).unwrap();

        assert_eq!(entry.name, "Marohi Erqi");
        assert_eq!(entry.basetype.as_deref(), Some("Karui Maul"));
        assert!(entry.basetypes.is_empty());
        assert_eq!(entry.itemclass, "Two Handed Mace");
        assert_eq!(entry.variants, vec!["Pre 2.6.0", "Current"]);
        assert_eq!(entry.variant_slots, 1);

        assert_eq!(entry.explicits.len(), 4);
        assert_eq!(entry.explicits[0].line, "#% increased Physical Damage");
        assert_eq!(entry.explicits[0].variants, vec![0]);
        assert_eq!(entry.explicits[1].variants, vec![1]);
        assert_eq!(entry.explicits[2].variants, vec![0, 1]);
        assert_eq!(entry.explicits[3].line, "#% increased Area of Effect");

        // LevelReq skipped, AoE wording corrected
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_defaults_for_variantless_item() {
        let raw = RawUniqueItem {
            title: "Tabula Rasa".to_string(),
            base_name: "Simple Robe".to_string(),
            explicit_mod_lines: vec![
                RawLine::new("Has 6 White Sockets"),
                RawLine::new(ANOINT_LINE),
            ],
            variant_alts: 1,
            ..Default::default()
        };
        let entry = ReferenceBuilder::default()
            .build_entry(&raw, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(entry.variants, vec![SOLE_VARIANT]);
        assert_eq!(entry.explicits.len(), 1);
        assert_eq!(entry.explicits[0].variants, vec![0]);
        assert_eq!(entry.variant_slots, 2);
    }

    #[test]
    fn test_multiple_basetypes() {
        let raw = RawUniqueItem {
            title: "Precursor's Emblem".to_string(),
            base_name: "Topaz Ring".to_string(),
            variant_list: vec![
                "Topaz Ring".to_string(),
                "Sapphire Ring".to_string(),
                "Ruby Ring".to_string(),
            ],
            base_lines: vec![
                RawLine::new("Topaz Ring").on_variants([1]),
                RawLine::new("Sapphire Ring").on_variants([2]),
                RawLine::new("Ruby Ring").on_variants([3]),
            ],
            ..Default::default()
        };
        let entry = ReferenceBuilder::default()
            .build_entry(&raw, &mut Diagnostics::new())
            .unwrap();
        assert!(entry.basetype.is_none());
        assert_eq!(entry.basetypes.len(), 3);
        assert_eq!(entry.basetype_for(1), Some("Sapphire Ring"));
    }

    #[test]
    fn test_bad_variant_index() {
        let mut raw = marohi_erqi();
        raw.explicit_mod_lines.push(RawLine::new("+1 to Level of Socketed Gems").on_variants([3]));
        let err = ReferenceBuilder::default()
            .build_entry(&raw, &mut Diagnostics::new())
            .unwrap_err();
        assert!(matches!(
            err,
            VariantEngineError::InvalidVariantIndex { index: 3, count: 2, .. }
        ));
    }

    #[test]
    fn test_upgrade_paths() {
        assert_eq!(
            parse_upgrade("Upgrades to unique{Kaom's Way} via currency{Blessing of Chayula}"),
            Upgrade::Path(UpgradePath {
                dest: "Kaom's Way".to_string(),
                currency: "Blessing of Chayula".to_string(),
            })
        );
        assert_eq!(
            parse_upgrade("Upgrades to unique{Inspired Learning} using currency{Vial of Awakening}"),
            Upgrade::Path(UpgradePath {
                dest: "Inspired Learning".to_string(),
                currency: "Vial of Awakening".to_string(),
            })
        );
        assert_eq!(
            parse_upgrade("Upgradeable in a Temple room"),
            Upgrade::Text("Upgradeable in a Temple room".to_string())
        );

        let mut raw = marohi_erqi();
        raw.upgrade_paths = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            ReferenceBuilder::default().build_entry(&raw, &mut Diagnostics::new()),
            Err(VariantEngineError::MultipleUpgradePaths { count: 2, .. })
        ));
    }

    #[test]
    fn test_build_skips_generated_and_sorts() {
        let raw = vec![
            RawUniqueItem {
                title: "Zerphi's Heart".to_string(),
                base_name: "Gold Amulet".to_string(),
                ..Default::default()
            },
            marohi_erqi(),
            RawUniqueItem {
                title: "Replica Dreamfeather".to_string(),
                base_name: "Eternal Sword".to_string(),
                ..Default::default()
            },
        ];
        let output = ReferenceBuilder::default()
            .skip_generated(["Replica Dreamfeather"])
            .build(&raw)
            .unwrap();

        let names: Vec<_> = output.db.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Marohi Erqi", "Zerphi's Heart"]);
        assert!(output
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::GeneratedSkipped { item } if item == "Replica Dreamfeather")));
    }

    #[test]
    fn test_raw_json_shape() {
        let json = r#"{
            "title": "Marohi Erqi",
            "baseName": "Karui Maul",
            "type": "Two Handed Mace",
            "variantList": ["Pre 2.6.0", "Current"],
            "explicitModLines": [
                {"line": "(200-250)% increased Physical Damage", "variantList": [1]},
                {"line": "+(30-40) to Strength", "crafted": true}
            ]
        }"#;
        let raw: RawUniqueItem = serde_json::from_str(json).unwrap();
        let entry = ReferenceBuilder::default()
            .build_entry(&raw, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(entry.explicits[0].variants, vec![0]);
        assert!(entry.explicits[1].crafted);
        assert_eq!(entry.explicits[1].ranges, vec![[30.0, 40.0]]);
    }
}
