//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference was not found.
    #[error("ref not found: {name}")]
    NotFound { name: String },

    /// The ref name is invalid.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// A compare-and-swap saw a different value than the caller expected.
    #[error("ref {name} changed concurrently: expected {expected}, found {actual}")]
    Conflict {
        name: String,
        expected: String,
        actual: String,
    },

    /// Another writer holds the lock file for this ref.
    #[error("ref {name} is locked by another writer")]
    Locked { name: String },

    /// Symbolic refs nest too deeply or form a cycle.
    #[error("symbolic ref chain too deep starting at {name}")]
    SymrefLoop { name: String },

    /// A ref file could not be parsed.
    #[error("corrupt ref {name}: {reason}")]
    Corrupt { name: String, reason: String },

    /// A lock guarding in-memory state was poisoned by a panicking thread.
    #[error("ref store lock poisoned")]
    Poisoned,

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
