use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args};
use enchantrack_core::catalog::CatalogSource;

use crate::error::{CliError, Result};

pub const DEFAULT_CATALOG_DIR: &str = "enchantments";
pub const DEFAULT_GAME_VERSION: &str = "java_1.21.10";
pub const DEFAULT_STATE_FILE: &str = "enchantrack-state.json";
pub const DEFAULT_ICON_ROOT: &str = "item_icons";

const VERSION_PREFIX: &str = "java_";

/// Options shared by every subcommand. Flags win over environment
/// variables, which win over defaults.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Catalog file to load. Overrides `--catalog-dir` and `--game-version`.
    #[arg(long, global = true, env = "ENCHANTRACK_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Directory holding `java_<version>.json` catalog files.
    #[arg(long, global = true, env = "ENCHANTRACK_CATALOG_DIR", default_value = DEFAULT_CATALOG_DIR)]
    pub catalog_dir: PathBuf,

    /// Game version to load from the catalog directory.
    #[arg(long, global = true, default_value = DEFAULT_GAME_VERSION)]
    pub game_version: String,

    /// Progress state file.
    #[arg(long, global = true, env = "ENCHANTRACK_STATE", default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Root that icon paths in JSON output are resolved against.
    #[arg(long, global = true, default_value = DEFAULT_ICON_ROOT)]
    pub icon_root: String,

    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            catalog: None,
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            game_version: DEFAULT_GAME_VERSION.to_string(),
            state: PathBuf::from(DEFAULT_STATE_FILE),
            icon_root: DEFAULT_ICON_ROOT.to_string(),
            json: false,
            verbose: 0,
        }
    }
}

/// Paths and labels a session runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub catalog_label: String,
    pub state_path: PathBuf,
    pub icon_root: String,
    pub json: bool,
}

impl Config {
    #[must_use]
    pub fn resolve(args: &GlobalArgs) -> Self {
        let catalog_path = args
            .catalog
            .clone()
            .unwrap_or_else(|| catalog_path_for(&args.catalog_dir, &args.game_version));
        let catalog_label = catalog_path
            .file_stem()
            .map_or_else(|| catalog_path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        Self {
            catalog_path,
            catalog_label,
            state_path: args.state.clone(),
            icon_root: args.icon_root.clone(),
            json: args.json,
        }
    }

    /// Read the catalog file. A missing file is reported as
    /// [`CatalogSource::Missing`]; other I/O failures are errors.
    pub fn read_catalog(&self) -> Result<CatalogSource> {
        match fs::read_to_string(&self.catalog_path) {
            Ok(text) => Ok(CatalogSource::Text(text)),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    target: "enchantrack.cli",
                    path = %self.catalog_path.display(),
                    "catalog file not found, continuing with an empty catalog"
                );
                Ok(CatalogSource::Missing)
            }
            Err(error) => Err(error.into()),
        }
    }
}

/// Normalize `1.21.10` and `java_1.21.10` to `java_1.21.10`.
#[must_use]
pub fn version_stem(version: &str) -> String {
    let version = version.trim().trim_end_matches(".json");
    if version.starts_with(VERSION_PREFIX) {
        version.to_string()
    } else {
        format!("{VERSION_PREFIX}{version}")
    }
}

#[must_use]
pub fn catalog_path_for(dir: &Path, version: &str) -> PathBuf {
    dir.join(format!("{}.json", version_stem(version)))
}

/// Catalog versions available in `dir`, oldest first.
pub fn list_versions(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(CliError::CatalogNotFound {
                path: dir.to_path_buf(),
            });
        }
        Err(error) => return Err(error.into()),
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(".json") {
            if stem.starts_with(VERSION_PREFIX) {
                versions.push(stem.to_string());
            }
        }
    }
    versions.sort_by(|a, b| compare_versions(a, b));
    Ok(versions)
}

/// Order `java_1.9` before `java_1.21.10` by comparing numeric components.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts = |stem: &str| -> Vec<u32> {
        stem.trim_start_matches(VERSION_PREFIX)
            .split('.')
            .map(|part| part.parse().unwrap_or(0))
            .collect()
    };
    parts(a).cmp(&parts(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn version_stem_accepts_bare_and_prefixed() {
        assert_eq!(version_stem("1.21.10"), "java_1.21.10");
        assert_eq!(version_stem("java_1.21.10"), "java_1.21.10");
        assert_eq!(version_stem("java_1.21.json"), "java_1.21");
    }

    #[test]
    fn explicit_catalog_overrides_directory() {
        let args = GlobalArgs {
            catalog: Some(PathBuf::from("custom/catalog.json")),
            ..GlobalArgs::default()
        };
        let config = Config::resolve(&args);
        assert_eq!(config.catalog_path, PathBuf::from("custom/catalog.json"));
        assert_eq!(config.catalog_label, "catalog");
    }

    #[test]
    fn default_resolution_uses_version_file() {
        let config = Config::resolve(&GlobalArgs::default());
        assert_eq!(
            config.catalog_path,
            PathBuf::from("enchantments").join("java_1.21.10.json")
        );
        assert_eq!(config.catalog_label, "java_1.21.10");
        assert_eq!(config.state_path, PathBuf::from("enchantrack-state.json"));
    }

    #[test]
    fn versions_are_sorted_numerically() {
        let dir = tempdir().expect("tempdir");
        for name in ["java_1.21.10.json", "java_1.9.json", "java_1.21.json", "notes.txt", "bedrock_1.0.json"] {
            fs::write(dir.path().join(name), "[]").expect("write");
        }
        assert_eq!(
            list_versions(dir.path()).expect("versions"),
            vec!["java_1.9", "java_1.21", "java_1.21.10"]
        );
    }

    #[test]
    fn missing_catalog_dir_is_reported() {
        let dir = tempdir().expect("tempdir");
        let error = list_versions(&dir.path().join("absent")).expect_err("missing dir");
        assert!(matches!(error, CliError::CatalogNotFound { .. }));
    }

    #[test]
    fn missing_catalog_file_reads_as_missing_source() {
        let dir = tempdir().expect("tempdir");
        let config = Config::resolve(&GlobalArgs {
            catalog_dir: dir.path().to_path_buf(),
            ..GlobalArgs::default()
        });
        assert_eq!(config.read_catalog().expect("read"), CatalogSource::Missing);
    }
}
