use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Reasons a catalog document is rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog entry {index} has an empty name")]
    EmptyName { index: usize },

    #[error("catalog entry {index} duplicates enchantment name: {name}")]
    DuplicateName { index: usize, name: String },

    #[error("enchantment {name} has max_level 0")]
    ZeroMaxLevel { name: String },

    #[error("enchantment {name} has max_level {max_level}, above the limit of {limit}")]
    MaxLevelTooHigh {
        name: String,
        max_level: u32,
        limit: u32,
    },

    #[error("enchantment {name} has non-positive rarity_weight {weight}")]
    InvalidWeight { name: String, weight: f64 },
}

/// A progress snapshot that could not be decoded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("progress snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("progress snapshot must be a JSON object")]
    NotAnObject,
}

/// Failures of the key-value persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

impl StorageError {
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("level {level} is out of range for {name} (max {max_level})")]
    LevelOutOfRange {
        name: String,
        level: u32,
        max_level: u32,
    },

    #[error("unknown view mode: {0}")]
    UnknownViewMode(String),

    #[error("unknown {kind} filter value: {value}")]
    UnknownFilter { kind: &'static str, value: String },
}
