pub mod core;

use std::path::PathBuf;

pub use self::core::Language;

/// Failures while loading a vocabulary
#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error("language file not found: {0}")]
    NotFound(String),
    #[error("language file is not valid utf-8: {0}")]
    NotUtf8(String),
    #[error("unable to deserialize language json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read word file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("vocabulary '{0}' has no words")]
    Empty(String),
}
