use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot access task file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task file '{}' is not valid JSON: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("task file '{}' is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
    #[error("cannot serialize tasks: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("task with ID {0} not found")]
    NotFound(u32),
    #[error("{0}")]
    Validation(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
