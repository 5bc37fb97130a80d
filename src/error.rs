use thiserror::Error;

use crate::core::ModClass;

/// Main error type for the variant engine
#[derive(Error, Debug)]
pub enum VariantEngineError {
    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file errors
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// An observed mod and its reference counterpart share a template but not
    /// a placeholder count. The reference entry is corrupt.
    #[error(
        "Range count mismatch on '{item}' ({mod_class}): observed '{observed}' has {observed_ranges} ranges, reference '{reference}' has {reference_ranges}"
    )]
    RangeCountMismatch {
        item: String,
        mod_class: ModClass,
        observed: String,
        reference: String,
        observed_ranges: usize,
        reference_ranges: usize,
    },

    /// Raw variant list points past the item's variant labels
    #[error("Variant index {index} out of range for '{item}' ({count} variants)")]
    InvalidVariantIndex {
        item: String,
        index: usize,
        count: usize,
    },

    /// Raw item declares more than one upgrade path
    #[error("'{item}' has {count} upgrade paths, expected at most one")]
    MultipleUpgradePaths { item: String, count: usize },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, VariantEngineError>;
