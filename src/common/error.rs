//! Error types for SawitDB.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in SawitDB.
///
/// Lookups on an index never produce an error: an absent key is an empty
/// result and deleting an absent key returns `false`. Errors are reserved for
/// misconfiguration, detected corruption and CDC log I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from CDC log operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An index was configured with an order below the minimum.
    ///
    /// No split strategy is defined for fewer than two keys per node.
    #[error("invalid index order {order}: must be at least {min}")]
    InvalidOrder { order: usize, min: usize },

    /// A structural invariant of an index does not hold.
    #[error("index corrupted: {0}")]
    Corrupted(String),

    /// A configuration value is missing or malformed.
    #[error("invalid value for {name}: {message}")]
    Config { name: String, message: String },

    /// A CDC log record failed checksum verification.
    ///
    /// `line` is 1-based.
    #[error("checksum mismatch in CDC log at line {line}")]
    ChecksumMismatch { line: usize },
}
