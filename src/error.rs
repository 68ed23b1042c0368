// ⚠️ Error taxonomy for the synthesis engine and its repository layer
//
// The engine itself almost never fails: malformed input degrades to empty
// results and structural synthesis failures fall back to a fixed value.
// These types exist for callers that want the failure instead of the fallback,
// and for the persistence collaborator.

use thiserror::Error;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Library-level errors
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Identifier synthesis broke a structural invariant
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// In-memory store lock was poisoned by a panicking writer
    #[error("Storage lock poisoned: {0}")]
    LockPoisoned(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Structural failures while building a unified registration identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("identifier prefix must be {expected} characters, got {actual}")]
    PrefixLength { expected: usize, actual: usize },

    #[error("unsupported character '{character}' at position {position}")]
    InvalidCharacter { position: usize, character: char },

    #[error("identifier must be {expected} characters, got {actual}")]
    CodeLength { expected: usize, actual: usize },
}
