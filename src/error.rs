use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error type covering input, configuration, locking, and persistence failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("required file {path} does not exist")]
    MissingFile { path: PathBuf },

    #[error("file {path} is not valid UTF-8: {reason}")]
    Encoding { path: PathBuf, reason: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("failed to parse config {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to persist {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lock error: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CatalogError {
    /// True for failures caused by missing or unreadable inputs rather than by a write.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingFile { .. }
                | Self::Encoding { .. }
                | Self::Configuration { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Classify an I/O error raised while reading `path`.
    pub(crate) fn from_read(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::MissingFile {
                path: path.to_path_buf(),
            },
            io::ErrorKind::InvalidData => Self::Encoding {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
            _ => Self::Io(err),
        }
    }

    pub(crate) fn persistence(path: &Path, source: io::Error) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            source,
        }
    }
}
