//! Error types for the activity model
//!
//! This module provides proper error handling instead of panics.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while building or sampling a description
#[derive(Debug)]
pub enum ModelError {
    /// A precondition on caller-supplied input was violated
    Precondition {
        /// Description of the violated precondition
        context: String,
    },

    /// A name lookup against the activity library failed
    UnknownName {
        /// What kind of name was looked up (e.g., "activity", "role")
        kind: &'static str,
        /// The name that was not found
        name: String,
    },

    /// Dimension mismatch between expected and actual
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Context (e.g., "parameter vector", "endpoint mean")
        context: String,
    },

    /// An internal invariant was violated by the sampler itself
    ///
    /// These indicate a sampler defect, not bad input. The sampling
    /// session must be aborted; retrying with the same seed reproduces
    /// the same defect.
    Consistency {
        /// Description of the violated invariant
        description: String,
    },

    /// Numerical instability detected (failed Cholesky factorization)
    NumericalInstability {
        /// Description of the issue
        description: String,
    },

    /// Loading the activity library or a data table failed
    Load(LoadError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Precondition { context } => {
                write!(f, "Precondition violated: {}", context)
            }
            ModelError::UnknownName { kind, name } => {
                write!(f, "Unknown {} name: {:?}", kind, name)
            }
            ModelError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            ModelError::Consistency { description } => {
                write!(f, "Consistency violation: {}", description)
            }
            ModelError::NumericalInstability { description } => {
                write!(f, "Numerical instability: {}", description)
            }
            ModelError::Load(e) => write!(f, "Load failed: {}", e),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for ModelError {
    fn from(e: LoadError) -> Self {
        ModelError::Load(e)
    }
}

/// Errors that can occur while loading the activity library or data tables
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// File contents could not be parsed
    Parse {
        /// Path of the offending file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Parsed contents fail validation (e.g., non-stochastic transition row)
    Invalid {
        /// Description of the validation failure
        description: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse {
                path,
                line,
                message,
            } => {
                write!(f, "Parse error at {}:{}: {}", path.display(), line, message)
            }
            LoadError::Invalid { description } => {
                write!(f, "Invalid library: {}", description)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
