//! Screen controller for the user management screen.
//!
//! # Responsibility
//! - Hold UI-bound state: input fields, selection, loaded user list.
//! - Drive load / add / delete against the `UserStore`.
//! - Turn outcomes and failures into user-visible notices.
//!
//! # Invariants
//! - Validation happens before the store is touched.
//! - Failed commands leave screen state unchanged.
//! - Errors stop at the controller boundary; `run`/`launch` never fail.
//! - Launched commands are not ordered against each other.

mod controller;
mod notice;
mod state;

pub use controller::{ScreenController, ScreenError};
pub use notice::{Notice, NoticeLevel, ScreenCommand, ScreenOutcome};
pub use state::{IdFieldMode, ScreenConfig, ScreenState};
