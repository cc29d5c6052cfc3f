//! Dibs Storage Layer
//!
//! Implements the `ClaimStore` trait over two backends:
//!
//! - [`MemoryStore`]: claims held in process memory, for tests and
//!   embedding dibs in a host application
//! - [`SqliteStore`]: claims persisted in a SQLite database
//!
//! Both backends apply conditional updates at single-claim granularity: a
//! patch lands only if the claim's current status matches the caller's
//! expectation, which is how concurrent writers against the same claim are
//! serialized.
//!
//! # Examples
//!
//! ```no_run
//! use dibs_store::SqliteStore;
//!
//! let store = SqliteStore::new("dibs.db").unwrap();
//! // Store is now ready for claim operations
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A claim with this id already exists
    #[error("Duplicate claim id")]
    Duplicate,

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
