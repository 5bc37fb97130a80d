//! Engine configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock behaviour:
//!
//! ```
//! use unique_variant_engine::EngineConfig;
//!
//! let config = EngineConfig::from_yaml_str("threshold: 90").unwrap();
//! assert_eq!(config.threshold, 90.0);
//! assert_eq!(config.corrections, Default::default());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Score a pair (and a whole variant) needs to count as a match
pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Literal text replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRewrite {
    pub from: String,
    pub to: String,
}

impl TextRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Known wording defects in reference and observed mod text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Corrections {
    /// Applied by the canonicalizer after number substitution
    pub line_rewrites: Vec<TextRewrite>,

    /// Applied to lower-cased templates before comparing them
    pub synonyms: Vec<TextRewrite>,
}

impl Default for Corrections {
    fn default() -> Self {
        Self {
            line_rewrites: vec![TextRewrite::new(
                "Area of Effect of Area Skills",
                "Area of Effect",
            )],
            synonyms: vec![TextRewrite::new(
                "additional attack physical damage",
                "added attack physical damage",
            )],
        }
    }
}

/// What a patch does to the reference entries it selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PatchAction {
    /// Drop the entry from the database
    Remove,
    /// Replace the entry's base type (clears per-variant base types)
    SetBasetype { to: String },
    /// Replace a mod template, in both implicits and explicits
    RewriteLine { from: String, to: String },
}

/// Data correction for a known-broken reference row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    /// Item name the patch applies to
    pub name: String,

    /// Restrict to the entry with this base type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basetype: Option<String>,

    #[serde(flatten)]
    pub action: PatchAction,
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Threshold used by the `top`/`filter` convenience calls
    pub threshold: f64,

    pub corrections: Corrections,

    /// Reference data corrections applied after load
    pub patches: Vec<EntryPatch>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            corrections: Corrections::default(),
            patches: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(
            "Loaded config from {} ({} patches)",
            path.as_ref().display(),
            config.patches.len()
        );
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<impl AsRef<Path>>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
