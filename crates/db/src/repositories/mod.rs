//! Repositories over the `SeaORM` entities.
//!
//! [`CatalogRepository`] serves the read-only listings; [`JournalRepository`]
//! owns the atomic entry commit and the post-commit reconciliation.

pub mod catalog;
pub mod journal;

pub use catalog::CatalogRepository;
pub use journal::JournalRepository;
