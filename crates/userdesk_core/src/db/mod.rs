//! Opening `user.db` and keeping its schema current.
//!
//! # Responsibility
//! - Hand out SQLite connections whose `User` table is ready for use.
//! - Apply the migration registry before any row is read or written.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A file written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_dir, open_db_in_memory, DB_FILE_NAME};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the user database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected the open, a pragma, or a migration statement.
    Sqlite(rusqlite::Error),
    /// The data directory holding `user.db` could not be created.
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// `user_version` is ahead of the newest migration in this build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create database directory `{}`: {source}",
                path.display()
            ),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "user.db schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDirectory { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
