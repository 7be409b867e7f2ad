//! Error types for site assembly.

use std::io;
use std::path::{Path, PathBuf};

/// Error returned by site assembly operations.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// Site root does not exist or is not a directory.
    #[error("Site root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Ref filter pattern failed to compile.
    #[error("Invalid ref pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Search index could not be serialized back.
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Site manifest could not be parsed or serialized.
    #[error("YAML error in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Alias name is unusable as a directory name.
    #[error("Invalid alias name: {0}")]
    InvalidAlias(String),
}

impl AssembleError {
    /// Wrap an I/O error with the path it occurred at.
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Extension for attaching a path to `io::Result` values.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T, AssembleError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, AssembleError> {
        self.map_err(|e| AssembleError::io(path, e))
    }
}
