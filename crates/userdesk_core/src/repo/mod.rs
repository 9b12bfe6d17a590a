//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for `User` rows.
//! - Isolate SQLite query details from the async store and screen logic.
//!
//! # Invariants
//! - Repositories refuse connections that are not fully migrated.

pub mod user_repo;
