//! Catalog configuration.
//!
//! Resolution order: built-in defaults, then an optional `sdkdocs.toml`,
//! then explicit overrides from the command line or environment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::DocCatalog;
use crate::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "sdkdocs.toml";

/// Docs root used when nothing else is configured.
pub const DEFAULT_DOCS_DIR: &str = "docs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory containing `js-sdk/`, `dart-sdk/` and `SDK_DOCUMENTATION.md`.
    pub docs_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
        }
    }
}

impl CatalogConfig {
    /// Parse a config file. A relative `docs_dir` is resolved against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.docs_dir.is_relative()
            && let Some(parent) = path.parent()
        {
            config.docs_dir = parent.join(&config.docs_dir);
        }
        Ok(config)
    }

    /// Load configuration from `explicit` if given, otherwise from
    /// `sdkdocs.toml` in `cwd` when it exists, otherwise the defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("Loading config from {}", candidate.display());
            return Self::from_file(&candidate);
        }
        Ok(Self::default())
    }

    pub fn with_docs_dir(mut self, docs_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = docs_dir {
            self.docs_dir = dir;
        }
        self
    }

    pub fn into_catalog(self) -> DocCatalog {
        DocCatalog::builtin(self.docs_dir)
    }
}
