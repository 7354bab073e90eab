//! Error types for pagepool.

use thiserror::Error;

use crate::common::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagepool.
///
/// Every failure is returned synchronously to the immediate caller; nothing
/// is retried or swallowed inside the pool.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a backing store, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation requires the page to be cached, and it is not.
    #[error("{0} is not resident in the buffer pool")]
    NotResident(PageId),

    /// A file with this name is already registered in the catalog.
    #[error("File '{0}' already exists")]
    AlreadyExists(String),

    /// No file with this name is registered in the catalog.
    #[error("File '{0}' does not exist")]
    NotFound(String),

    /// The pool's internal structures disagree with each other.
    ///
    /// This indicates a bug in the pool, not a recoverable condition.
    #[error("Buffer pool invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }
}
