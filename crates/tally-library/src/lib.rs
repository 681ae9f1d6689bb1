//! Lending library on top of [`tally_store`].
//!
//! # Key Types
//!
//! - [`Book`] -- catalogue entry keyed by ISBN, flagged while lent out
//! - [`Member`] -- registered borrower with the ISBNs they hold
//! - [`Library`] -- both stores plus the borrow / give-back rules
//! - [`LendingError`] -- why a library operation was rejected

pub mod book;
pub mod error;
pub mod library;
pub mod member;

pub use book::{Book, BookField, BookPatch};
pub use error::{LendingError, LendingResult};
pub use library::{Library, LibraryConfig, LibraryLoad, Loan, DEFAULT_LOAN_LIMIT};
pub use member::{Member, MemberField, MemberPatch};
