use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of an ID update run. Any of these aborts before the registry is saved.
#[derive(Debug, Error)]
pub enum IdsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk content tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid registry JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to generate a unique ID after {attempts} attempts")]
    ExhaustedGeneration { attempts: usize },

    #[error("ID {id} not found in any files (last recorded at {path})")]
    OrphanedIdentifier { id: String, path: String },
}

impl IdsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IdsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IdsError>;
