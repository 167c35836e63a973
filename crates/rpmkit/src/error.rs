//! Error types for transaction bookkeeping and package database queries.
//!
//! Errors are categorized so the presentation layer can pick a message and
//! exit behavior without matching on every variant.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of rpmkit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Package is not part of the pending transaction
    NotFound,
    /// The installed-package database could not be queried
    DatabaseUnavailable,
    /// Caller supplied something that could not be parsed
    InvalidInput,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Package not in transaction",
            Self::DatabaseUnavailable => "Package database unavailable",
            Self::InvalidInput => "Invalid input",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Add the package to the transaction before changing its mode",
            Self::DatabaseUnavailable => {
                "Check that rpm is installed and the database path is readable"
            }
            Self::InvalidInput => "Use the name-[epoch:]version-release.arch form",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while managing a transaction or querying packages.
#[derive(Debug, Error)]
pub enum Error {
    /// The package has no reason record in the transaction
    #[error("package not in transaction: {identity}")]
    NotFound {
        /// Rendered identity of the missing package
        identity: String,
    },

    /// The package database collaborator could not be queried
    #[error("package database unavailable: {message}")]
    DatabaseUnavailable {
        /// Details from the failed query
        message: String,
    },

    /// No rpm executable could be located
    #[error("rpm not found in PATH or standard locations")]
    RpmNotFound,

    /// Snapshot file not found at the specified path
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    /// rpm query output could not be interpreted
    #[error("unexpected rpm output at line {line}: {message}")]
    QueryParse {
        /// Line number in the query output (1-indexed)
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A package identity string could not be parsed
    #[error("invalid package identity: {input}")]
    InvalidIdentity {
        /// The rejected input
        input: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::DatabaseUnavailable { .. }
            | Error::RpmNotFound
            | Error::SnapshotNotFound(_)
            | Error::QueryParse { .. } => ErrorCategory::DatabaseUnavailable,
            Error::InvalidIdentity { .. } => ErrorCategory::InvalidInput,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Other,
        }
    }

    /// Create an error from a failed rpm invocation.
    pub fn from_rpm_output(stderr: &str, status: Option<i32>) -> Self {
        let stderr = stderr.trim();
        let message = match (stderr.is_empty(), status) {
            (false, _) => stderr.to_string(),
            (true, Some(code)) => format!("rpm exited with status {code}"),
            (true, None) => "rpm terminated by signal".to_string(),
        };
        Error::DatabaseUnavailable { message }
    }
}

/// Result type for rpmkit operations.
pub type Result<T> = std::result::Result<T, Error>;
