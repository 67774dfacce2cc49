//! SQLite backend for the Sahaya platform store.
//!
//! Database access goes through [`tokio_rusqlite`], keeping rusqlite calls on
//! a dedicated thread off the async runtime. The cross-entity invariants (the
//! rating fold, the admin-approval cascade, all-or-nothing match proposals)
//! are enforced here with SQL transactions rather than by convention.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
