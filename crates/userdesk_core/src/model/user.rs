//! User record model.
//!
//! # Responsibility
//! - Define the row shape of the `User` table.
//! - Validate required name fields before they reach storage.
//!
//! # Invariants
//! - `uid` is the primary key; `0` means "not yet persisted".
//! - Names stored by the screen are trimmed and non-blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a `User` row.
pub type UserId = i64;

/// Identifier carried by records that the store has not assigned yet.
pub const UNSAVED_USER_ID: UserId = 0;

/// Validation failures for user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    BlankFirstName,
    BlankLastName,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFirstName => write!(f, "first name must not be blank"),
            Self::BlankLastName => write!(f, "last name must not be blank"),
        }
    }
}

impl Error for UserValidationError {}

/// One row of the `User` table.
///
/// Serialized with the column names used by the table (`firstName`,
/// `lastName`) so exported rows match the storage schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// Builds an unsaved user from raw input fields.
    ///
    /// Both names are trimmed; blank names are rejected.
    pub fn new(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        let user = Self {
            uid: UNSAVED_USER_ID,
            first_name: first_name.as_ref().trim().to_string(),
            last_name: last_name.as_ref().trim().to_string(),
        };
        user.validate()?;
        Ok(user)
    }

    /// Checks that both name fields contain non-whitespace text.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(UserValidationError::BlankFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(UserValidationError::BlankLastName);
        }
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.uid != UNSAVED_USER_ID
    }

    /// Row text shown in the user list: `"{uid} - {first} {last}"`.
    pub fn display_label(&self) -> String {
        format!("{} - {} {}", self.uid, self.first_name, self.last_name)
    }
}
