use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the analysis core.
///
/// Structural errors (`InvalidFormat`) abort opening a store entirely.
/// Per-channel errors (`UnknownChannel`, `InvalidChannel`) are local to one
/// channel request; a multi-channel window load keeps going and reports them
/// per channel. `InsufficientData` and `Busy` are recoverable: widen the
/// window, or retry after the worker finishes.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("{path}: not a valid sensor log ({reason})")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("channel '{0}' is invalid (length differs from TIME)")]
    InvalidChannel(String),

    #[error("insufficient data: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("worker is busy with a running task")]
    Busy,

    #[error("worker task aborted before producing a result")]
    TaskAborted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("option group '{group}' missing parameter '{key}'")]
    MissingOption { group: String, key: String },

    #[error("invalid options document: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("hdf5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LogError>;
