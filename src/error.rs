//! Error types shared by the store, the analyzers and the HTTP layer.

use std::path::{Path, PathBuf};

/// Failures of the request-time operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{0} data is not available")]
    DataUnavailable(&'static str),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn stop_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Stop",
            id: id.into(),
        }
    }

    pub fn route_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Route",
            id: id.into(),
        }
    }

    pub fn block_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "AGEB",
            id: id.into(),
        }
    }

    /// HTTP status code this error is surfaced with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::DataUnavailable(_) | Self::Unexpected(_) => 500,
        }
    }
}

/// Failures while loading the static files at startup.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file not found: {0}")]
    Missing(PathBuf),

    #[error("could not read {file}: {source}")]
    Corrupt {
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("neither stop nor ridership data could be loaded")]
    NoData,
}

impl DataLoadError {
    pub fn corrupt(file: &Path, source: anyhow::Error) -> Self {
        Self::Corrupt {
            file: file.to_path_buf(),
            source,
        }
    }
}
