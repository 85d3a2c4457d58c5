//! Error type shared by the transform stages.
//!
//! Per-file parse failures are caught by the loader and turned into skips;
//! everything else propagates and aborts the action.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Malformed tag '{tag}' in {}: expected exactly one ':'", .path.display())]
    MalformedTag { path: PathBuf, tag: String },

    #[error("Index file {} needs two '---' boundary lines, found {found}", .path.display())]
    IndexBoundary { path: PathBuf, found: usize },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TransformError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TransformError::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
