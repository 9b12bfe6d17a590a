//! Domain model for the user screen.
//!
//! # Invariants
//! - A `User` with `uid == UNSAVED_USER_ID` has never been persisted.
//! - Persisted ids are assigned by the store, never by callers.

pub mod user;
