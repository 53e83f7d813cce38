use std::path::PathBuf;

use enchantrack_core::error::{StorageError, TrackerError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("state file error: {0}")]
    Storage(#[from] StorageError),

    #[error("catalog not found: {path}")]
    CatalogNotFound { path: PathBuf },

    #[error("unknown enchantment: {name}")]
    UnknownEnchantment { name: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::UnknownEnchantment { .. } => 2,
            Self::Tracker(
                TrackerError::LevelOutOfRange { .. }
                | TrackerError::UnknownViewMode(_)
                | TrackerError::UnknownFilter { .. },
            ) => 2,
            Self::CatalogNotFound { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use enchantrack_core::error::{CatalogError, TrackerError};

    #[test]
    fn runtime_failures_exit_with_one() {
        let error = CliError::from(std::io::Error::other("disk full"));
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "I/O error: disk full");

        let error = CliError::from(TrackerError::Catalog(CatalogError::ZeroMaxLevel {
            name: "mending".to_string(),
        }));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(CliError::invalid("bad").exit_code(), 2);
        let error = CliError::from(TrackerError::LevelOutOfRange {
            name: "sharpness".to_string(),
            level: 9,
            max_level: 5,
        });
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "level 9 is out of range for sharpness (max 5)");
    }

    #[test]
    fn missing_catalog_has_its_own_code() {
        let error = CliError::CatalogNotFound {
            path: "enchantments/java_0.0.json".into(),
        };
        assert_eq!(error.exit_code(), 3);
    }
}
