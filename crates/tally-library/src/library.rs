//! The [`Library`]: a book catalogue and a member register linked by loans.
//!
//! A loan is recorded on both sides: the book is flagged as lent and its ISBN
//! is appended to the member's held list. Each side is written through its
//! own store, so each store rewrites its snapshot and logs its own line.

use serde::{Deserialize, Serialize};
use tally_store::{Durability, Listing, LoadReport, RecordStore, StoreConfig, Update};
use tracing::{info, warn};

use crate::book::{Book, BookField, BookPatch};
use crate::error::{LendingError, LendingResult};
use crate::member::{Member, MemberPatch};

/// How many books a member may hold at once unless configured otherwise.
pub const DEFAULT_LOAN_LIMIT: usize = 3;

/// File locations and lending rules for a [`Library`].
///
/// Missing fields fall back to [`LibraryConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub loan_limit: usize,
    pub books: StoreConfig,
    pub members: StoreConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            books: StoreConfig::new("biblioteca.json", "biblioteca_log.txt"),
            members: StoreConfig::new("usuarios.json", "biblioteca_log.txt"),
            loan_limit: DEFAULT_LOAN_LIMIT,
        }
    }
}

/// Load reports for both stores of a library.
#[derive(Debug)]
pub struct LibraryLoad {
    pub books: LoadReport,
    pub members: LoadReport,
}

/// Persistence results for both sides of a borrow or return.
#[derive(Debug, Default)]
pub struct Loan {
    pub book: Durability,
    pub member: Durability,
}

impl Loan {
    pub fn is_durable(&self) -> bool {
        self.book.is_durable() && self.member.is_durable()
    }
}

fn durability(update: Update) -> Durability {
    match update {
        Update::Changed { durability, .. } => durability,
        Update::Unchanged => Durability::default(),
    }
}

/// A lending library over two record stores.
#[derive(Debug)]
pub struct Library {
    books: RecordStore<Book>,
    members: RecordStore<Member>,
    loan_limit: usize,
}

impl Library {
    /// Assemble a library from already-opened stores.
    pub fn new(books: RecordStore<Book>, members: RecordStore<Member>, loan_limit: usize) -> Self {
        Self {
            books,
            members,
            loan_limit,
        }
    }

    /// Open the file-backed library described by `config`.
    pub fn open(config: &LibraryConfig) -> (Self, LibraryLoad) {
        let (books, books_report) = RecordStore::open_files(&config.books);
        let (members, members_report) = RecordStore::open_files(&config.members);
        info!(
            books = books.len(),
            members = members.len(),
            loan_limit = config.loan_limit,
            "library opened"
        );
        (
            Self::new(books, members, config.loan_limit),
            LibraryLoad {
                books: books_report,
                members: members_report,
            },
        )
    }

    pub fn books(&self) -> &RecordStore<Book> {
        &self.books
    }

    pub fn members(&self) -> &RecordStore<Member> {
        &self.members
    }

    pub fn loan_limit(&self) -> usize {
        self.loan_limit
    }

    // ---------------------------------------------------------------
    // Catalogue
    // ---------------------------------------------------------------

    /// Add a book to the catalogue. New books always enter available.
    pub fn add_book(&mut self, mut book: Book) -> LendingResult<Durability> {
        book.lent = false;
        Ok(self.books.insert(book)?)
    }

    /// Remove a book that is not currently lent out.
    pub fn remove_book(&mut self, isbn: &str) -> LendingResult<(Book, Durability)> {
        let isbn = isbn.to_string();
        if self.books.get(&isbn).is_some_and(|b| b.lent) {
            return Err(LendingError::BookOnLoan { isbn });
        }
        Ok(self.books.remove(&isbn)?)
    }

    /// The whole catalogue in insertion order.
    pub fn list_books(&self) -> Listing<'_, Book> {
        self.books.list_all()
    }

    /// Case-insensitive search over one text field of the catalogue.
    pub fn find_books(&self, field: BookField, text: &str) -> Vec<&Book> {
        self.books.find_by(field, text)
    }

    // ---------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------

    /// Register a new member. New members start with no books.
    pub fn register_member(&mut self, mut member: Member) -> LendingResult<Durability> {
        member.held.clear();
        Ok(self.members.insert(member)?)
    }

    /// Remove a member who holds no books.
    pub fn remove_member(&mut self, id: &str) -> LendingResult<(Member, Durability)> {
        let id = id.to_string();
        if let Some(member) = self.members.get(&id) {
            if !member.held.is_empty() {
                return Err(LendingError::MemberHasLoans {
                    count: member.held.len(),
                    id,
                });
            }
        }
        Ok(self.members.remove(&id)?)
    }

    /// Every registered member in registration order.
    pub fn list_members(&self) -> Listing<'_, Member> {
        self.members.list_all()
    }

    /// The books a member holds, in borrow order.
    ///
    /// ISBNs that no longer resolve to a catalogue entry are left out.
    pub fn books_held_by(&self, member_id: &str) -> LendingResult<Vec<&Book>> {
        let member = self.member(member_id)?;
        Ok(member
            .held
            .iter()
            .filter_map(|isbn| self.books.get(isbn))
            .collect())
    }

    // ---------------------------------------------------------------
    // Loans
    // ---------------------------------------------------------------

    /// Lend a book to a member.
    ///
    /// Checks, in order: the member exists, the member is below the loan
    /// limit, the book exists, the book is not already lent. A rejected
    /// borrow leaves both stores untouched.
    pub fn borrow(&mut self, isbn: &str, member_id: &str) -> LendingResult<Loan> {
        let member = self.member(member_id)?;
        if member.held.len() >= self.loan_limit {
            return Err(LendingError::LimitReached {
                id: member.id.clone(),
                limit: self.loan_limit,
            });
        }
        let book = self.book(isbn)?;
        if book.lent {
            return Err(LendingError::AlreadyLent {
                isbn: book.isbn.clone(),
            });
        }

        let isbn = book.isbn.clone();
        let member_id = member.id.clone();
        let mut held = member.held.clone();
        held.push(isbn.clone());

        let book_side = self.books.update(&isbn, &BookPatch::lent(true))?;
        let member_side = self.members.update(&member_id, &MemberPatch::held(held))?;
        info!(%isbn, member = %member_id, "book lent");

        Ok(Loan {
            book: durability(book_side),
            member: durability(member_side),
        })
    }

    /// Take a book back from a member.
    ///
    /// The member must exist and currently hold the book. A book still in
    /// the catalogue must be flagged as lent. A held ISBN that is no longer
    /// in the catalogue is simply dropped from the member's list, so the
    /// member can be cleared and removed later.
    pub fn give_back(&mut self, isbn: &str, member_id: &str) -> LendingResult<Loan> {
        let member = self.member(member_id)?;
        if !member.holds(isbn) {
            return Err(LendingError::NotHeld {
                id: member.id.clone(),
                isbn: isbn.to_string(),
            });
        }
        let member_id = member.id.clone();
        let mut held = member.held.clone();
        if let Some(pos) = held.iter().position(|h| h == isbn) {
            held.remove(pos);
        }

        let Some(book) = self.books.get(&isbn.to_string()) else {
            warn!(%isbn, member = %member_id, "held book missing from catalogue; dropping it");
            let member_side = self.members.update(&member_id, &MemberPatch::held(held))?;
            return Ok(Loan {
                book: Durability::default(),
                member: durability(member_side),
            });
        };
        if !book.lent {
            return Err(LendingError::NotLent {
                isbn: book.isbn.clone(),
            });
        }
        let isbn = book.isbn.clone();

        let book_side = self.books.update(&isbn, &BookPatch::lent(false))?;
        let member_side = self.members.update(&member_id, &MemberPatch::held(held))?;
        info!(%isbn, member = %member_id, "book returned");

        Ok(Loan {
            book: durability(book_side),
            member: durability(member_side),
        })
    }

    /// Flush final snapshots of both stores.
    pub fn close(self) -> LendingResult<()> {
        self.books.close()?;
        self.members.close()?;
        Ok(())
    }

    fn member(&self, id: &str) -> LendingResult<&Member> {
        self.members
            .get(&id.to_string())
            .ok_or_else(|| LendingError::UnknownMember { id: id.to_string() })
    }

    fn book(&self, isbn: &str) -> LendingResult<&Book> {
        self.books
            .get(&isbn.to_string())
            .ok_or_else(|| LendingError::UnknownBook {
                isbn: isbn.to_string(),
            })
    }
}
