//! Core logic for the user management screen.
//! Owns the `User` table, the async record store and the screen controller.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod screen;
pub mod store;

pub use logging::{init_logging, logging_status, LogConfig, LogLevel, LoggingError};
pub use model::user::{User, UserId, UserValidationError, UNSAVED_USER_ID};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use screen::{
    IdFieldMode, Notice, NoticeLevel, ScreenCommand, ScreenConfig, ScreenController, ScreenError,
    ScreenOutcome, ScreenState,
};
pub use store::{StorageError, StorageResult, UserStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
