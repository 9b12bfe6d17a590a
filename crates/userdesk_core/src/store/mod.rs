//! Async record store over the `User` table.
//!
//! # Responsibility
//! - Own the SQLite connection used by the screen.
//! - Run repository calls off the caller's task on tokio's blocking pool.
//!
//! # Invariants
//! - One connection per store; the mutex serializes physical writes.
//! - Every call re-checks the schema through `SqliteUserRepository::try_new`.

mod user_store;

pub use user_store::{StorageError, StorageResult, UserStore};
