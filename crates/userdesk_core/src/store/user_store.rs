use crate::db::{open_db, open_db_in_dir, open_db_in_memory};
use crate::model::user::{User, UserId};
use crate::repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
use log::{debug, error, info};
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of a record store operation.
#[derive(Debug)]
pub enum StorageError {
    /// Repository or SQLite failure (I/O, constraint, schema).
    Repo(RepoError),
    /// A previous holder of the connection panicked.
    LockPoisoned,
    /// The blocking task running the query did not complete.
    TaskFailed(String),
}

impl StorageError {
    /// Returns whether SQLite rejected the write on a constraint (e.g. duplicate `uid`).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Repo(RepoError::Db(crate::db::DbError::Sqlite(
                rusqlite::Error::SqliteFailure(err, _)
            ))) if err.code == ErrorCode::ConstraintViolation
        )
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "user database connection lock is poisoned"),
            Self::TaskFailed(message) => write!(f, "storage task failed: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::LockPoisoned | Self::TaskFailed(_) => None,
        }
    }
}

impl From<RepoError> for StorageError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<crate::db::DbError> for StorageError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Async handle to the user table.
///
/// Cloning is cheap; clones share one connection.
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens `<dir>/user.db`.
    pub fn open_in_dir(dir: impl AsRef<Path>) -> StorageResult<Self> {
        Self::from_connection(open_db_in_dir(dir)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> StorageResult<Self> {
        SqliteUserRepository::try_new(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Returns every stored user in insertion order.
    pub async fn list_all(&self) -> StorageResult<Vec<User>> {
        self.with_repo("user_list", |repo| repo.list_all()).await
    }

    /// Inserts `user` and returns the id assigned by SQLite.
    pub async fn insert(&self, user: User) -> StorageResult<UserId> {
        self.with_repo("user_insert", move |repo| repo.insert(&user))
            .await
    }

    /// Deletes the user with `id`; absent ids are ignored.
    pub async fn delete_by_id(&self, id: UserId) -> StorageResult<()> {
        let removed = self
            .with_repo("user_delete", move |repo| repo.delete_by_id(id))
            .await?;
        if !removed {
            debug!("event=user_delete module=store status=noop uid={id}");
        }
        Ok(())
    }

    async fn with_repo<T, F>(&self, event: &'static str, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteUserRepository<'_>) -> RepoResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || -> StorageResult<T> {
            let guard = conn.lock().map_err(|_| StorageError::LockPoisoned)?;
            let repo = SqliteUserRepository::try_new(&guard)?;
            Ok(op(&repo)?)
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(err) => Err(StorageError::TaskFailed(err.to_string())),
        };

        match &result {
            Ok(_) => info!(
                "event={} module=store status=ok duration_ms={}",
                event,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={} module=store status=error duration_ms={} error={}",
                event,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
