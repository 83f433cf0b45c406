use std::path::PathBuf;
use thiserror::Error;

use crate::types::LogLevel;
use crate::value::DataType;

#[derive(Debug, Error)]
pub enum OptfigError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: DataType, found: DataType },

    #[error("Option format validation failed ({0})")]
    InvalidFormat(LogLevel),

    #[error("Input validation failed ({0})")]
    InvalidInput(LogLevel),

    #[error("Failed to write {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown file format '{0}' (expected json, csv or toml)")]
    UnknownFormat(String),
}
