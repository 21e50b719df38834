use std::io;
use std::path::PathBuf;

/// Errors surfaced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// Malformed identifier, missing parameter, or unknown sdk/topic.
    #[error("{0}")]
    InvalidRequest(String),

    /// Well-formed identifier with no registry entry or no backing file.
    #[error("Documentation not found: {id}")]
    NotFound { id: String },

    /// The backing file of an existing entry could not be read.
    #[error("Failed to read documentation file {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification used by the protocol layer to pick an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Internal,
}

impl DocError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ReadFailure { .. } => ErrorKind::Internal,
        }
    }

    /// Map a failed read of `path` (backing `id`) to the matching variant.
    pub(crate) fn from_read(id: String, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { id }
        } else {
            Self::ReadFailure { path, source }
        }
    }
}

/// Errors raised while loading [`crate::config::CatalogConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
