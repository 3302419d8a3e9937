use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MusterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in {path}: {message}")]
    Toml { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("Change rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
}

impl MusterError {
    pub fn toml(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        MusterError::Toml {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MusterError>;
