//! Error types for lending operations.

use tally_store::StoreError;
use thiserror::Error;

/// Reasons a library operation was rejected.
#[derive(Debug, Error)]
pub enum LendingError {
    /// The member id is not registered.
    #[error("unknown member: {id}")]
    UnknownMember { id: String },

    /// The member already holds the maximum number of books.
    #[error("member {id} already holds the maximum of {limit} books")]
    LimitReached { id: String, limit: usize },

    /// The ISBN is not in the catalogue.
    #[error("unknown book: {isbn}")]
    UnknownBook { isbn: String },

    /// The book is already lent out.
    #[error("book {isbn} is already lent out")]
    AlreadyLent { isbn: String },

    /// The book is not marked as lent, so it cannot be given back.
    #[error("book {isbn} is not lent out")]
    NotLent { isbn: String },

    /// The member does not hold this book.
    #[error("member {id} does not hold book {isbn}")]
    NotHeld { id: String, isbn: String },

    /// A lent book cannot be removed from the catalogue.
    #[error("book {isbn} is on loan and cannot be removed")]
    BookOnLoan { isbn: String },

    /// A member holding books cannot be removed.
    #[error("member {id} still holds {count} book(s)")]
    MemberHasLoans { id: String, count: usize },

    /// Underlying store failure (duplicate key, not found, storage).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for library operations.
pub type LendingResult<T> = Result<T, LendingError>;
