use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ScopeKind;

/// Error surfaced by the binary: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of a single `load` call (mount, scope filter, field resolution).
///
/// None of these are retried; they abort the call and reach the caller as-is.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Don't know how to retrieve '{0}'.")]
    FieldName(String),

    #[error("{kind} '{name}' does not exist.")]
    ScopeNotFound { kind: ScopeKind, name: String },

    #[error("{kind} '{name}' matches {count} rows on {date}.")]
    ScopeAmbiguous {
        kind: ScopeKind,
        name: String,
        date: String,
        count: usize,
    },

    #[error("Conflicting request: {0}")]
    RequestConflict(String),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LoadError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Exit code used when the error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            LoadError::FieldName(_) | LoadError::RequestConflict(_) => 2,
            LoadError::ScopeNotFound { .. } | LoadError::ScopeAmbiguous { .. } => 3,
            LoadError::Io { .. } | LoadError::Parse { .. } => 4,
        }
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
