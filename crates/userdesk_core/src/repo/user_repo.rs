//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list-all / insert / delete-by-id over the `User` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `insert` lets SQLite assign `uid` when the record is unsaved.
//! - Negative ids never reach the table; every stored `uid` reads back.
//! - `delete_by_id` on a missing id is a no-op, not an error.
//! - There is no update or find-by-id path.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::user::{User, UserId, UNSAVED_USER_ID};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT uid, firstName, lastName FROM User";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error, including constraint violations.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Caller-supplied `uid` cannot be stored as a primary key.
    InvalidId(UserId),
    /// Persisted data cannot be converted into a `User`.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::InvalidId(id) => write!(f, "invalid user id for insert: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the user table.
pub trait UserRepository {
    /// Returns every stored user in `uid` order.
    fn list_all(&self) -> RepoResult<Vec<User>>;
    /// Persists `user` and returns its assigned id.
    fn insert(&self, user: &User) -> RepoResult<UserId>;
    /// Removes the row with `id`; returns whether a row was removed.
    fn delete_by_id(&self, id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Wraps a connection after checking it carries the migrated schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_user_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!("{USER_SELECT_SQL} ORDER BY uid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn insert(&self, user: &User) -> RepoResult<UserId> {
        if user.uid < UNSAVED_USER_ID {
            return Err(RepoError::InvalidId(user.uid));
        }
        // NULL lets AUTOINCREMENT pick the next id.
        let uid = (user.uid != UNSAVED_USER_ID).then_some(user.uid);
        self.conn.execute(
            "INSERT INTO User (uid, firstName, lastName) VALUES (?1, ?2, ?3);",
            params![uid, user.first_name.as_str(), user.last_name.as_str()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn delete_by_id(&self, id: UserId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM User WHERE uid = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uid: UserId = row.get("uid")?;
    if uid <= UNSAVED_USER_ID {
        return Err(RepoError::InvalidData(format!(
            "invalid uid value `{uid}` in User.uid"
        )));
    }

    Ok(User {
        uid,
        first_name: row.get::<_, Option<String>>("firstName")?.unwrap_or_default(),
        last_name: row.get::<_, Option<String>>("lastName")?.unwrap_or_default(),
    })
}

fn ensure_user_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "User")? {
        return Err(RepoError::MissingRequiredTable("User"));
    }

    for column in ["uid", "firstName", "lastName"] {
        if !table_has_column(conn, "User", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "User",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
