use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a TcBuild job before (or while) the build tool runs
#[derive(Debug, Error)]
pub enum JobError {
    /// A descriptor file, or a reference/node/attribute inside one, is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// The package descriptor is missing a property or has a bad version
    #[error("Invalid project configuration: {0}")]
    Config(String),

    #[error("Failed to parse {path}: {source}")]
    Xml {
        path: PathBuf,
        source: roxmltree::Error,
    },

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Settings(#[from] ConfigError),
}

impl JobError {
    pub fn io(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        JobError::Io {
            path: path.into(),
            source: err,
        }
    }
}

pub type Result<T> = std::result::Result<T, JobError>;
