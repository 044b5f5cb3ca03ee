//! Configuration file.
//!
//! ```toml
//! [files]
//! investments = "Investments.csv"
//! quotes = "/shared/prices/Quotes-2020.csv"
//! transactions = "Transactions.csv"
//! ```
//!
//! Relative paths resolve against the data directory.

use std::path::{Path, PathBuf};

use cascade_ext_file::DataFiles;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Contents of `cascade.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CascadeConfig {
    /// Input file locations.
    pub files: FileOverrides,
}

/// Per-file overrides of the default file names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileOverrides {
    /// Investments file
    pub investments: Option<PathBuf>,
    /// Quotes file
    pub quotes: Option<PathBuf>,
    /// Transactions file
    pub transactions: Option<PathBuf>,
}

impl CascadeConfig {
    /// Name of the configuration file looked up in the data directory.
    pub const FILE_NAME: &'static str = "cascade.toml";

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
    }

    /// Loads `explicit` if given, otherwise `cascade.toml` from `data_dir`
    /// if it exists, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>, data_dir: &Path) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let implicit = data_dir.join(Self::FILE_NAME);
        if implicit.is_file() {
            debug!(path = %implicit.display(), "Using configuration file");
            Self::from_file(&implicit)
        } else {
            Ok(Self::default())
        }
    }

    /// Input files for `data_dir` with the overrides applied.
    pub fn data_files(&self, data_dir: &Path) -> DataFiles {
        let resolve = |path: &PathBuf| data_dir.join(path);
        let mut files = DataFiles::in_dir(data_dir);
        if let Some(path) = &self.files.investments {
            files = files.with_investments(resolve(path));
        }
        if let Some(path) = &self.files.quotes {
            files = files.with_quotes(resolve(path));
        }
        if let Some(path) = &self.files.transactions {
            files = files.with_transactions(resolve(path));
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CascadeConfig::resolve(None, dir.path()).unwrap();
        assert_eq!(config, CascadeConfig::default());
        assert_eq!(config.data_files(dir.path()), DataFiles::in_dir(dir.path()));
    }

    #[test]
    fn test_overrides_resolve_against_data_dir() {
        let config: CascadeConfig = toml::from_str(
            r#"
            [files]
            quotes = "prices/Quotes-2020.csv"
            transactions = "/abs/Transactions.csv"
            "#,
        )
        .unwrap();

        let files = config.data_files(Path::new("/data"));
        assert_eq!(files.investments, Path::new("/data/Investments.csv"));
        assert_eq!(files.quotes, Path::new("/data/prices/Quotes-2020.csv"));
        assert_eq!(files.transactions, Path::new("/abs/Transactions.csv"));
    }

    #[test]
    fn test_implicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cascade.toml"),
            "[files]\ninvestments = \"holdings.csv\"\n",
        )
        .unwrap();

        let config = CascadeConfig::resolve(None, dir.path()).unwrap();
        assert_eq!(
            config.data_files(dir.path()).investments,
            dir.path().join("holdings.csv")
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[files]\nprices = \"x.csv\"\n").unwrap();

        let err = CascadeConfig::resolve(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
