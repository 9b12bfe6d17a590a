//! FFI use-case API for the Flutter user screen.
//!
//! # Responsibility
//! - Expose the screen controller as flat, use-case-level functions via FRB.
//! - Keep one process-wide screen bound to one database directory.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Errors come back as strings or error notices, never as panics.
//! - Commands (`screen_add|list|delete`) are async from Dart's side; field
//!   edits and snapshots are sync.

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;
use userdesk_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, IdFieldMode, Notice,
    ScreenCommand, ScreenConfig, ScreenController, User, UserStore,
};

const NOT_OPEN_MESSAGE: &str = "screen is not open; call screen_open first";

static SCREEN: OnceLock<FfiScreen> = OnceLock::new();

struct FfiScreen {
    runtime: Runtime,
    controller: ScreenController,
    db_dir: PathBuf,
    notices: Mutex<UnboundedReceiver<Notice>>,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may create `log_dir`.
/// - Idempotent for the same `level + log_dir`; conflicting calls return error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the user list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserItem {
    pub uid: i64,
    pub first_name: String,
    pub last_name: String,
    /// Row text, `"{uid} - {first} {last}"`.
    pub label: String,
}

/// Everything the screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub id_field: String,
    pub id_editable: bool,
    pub first_name: String,
    pub last_name: String,
    pub selected_uid: Option<i64>,
    pub users: Vec<UserItem>,
}

/// Transient message for a toast/snackbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    pub is_error: bool,
    pub message: String,
}

impl From<Notice> for NoticeItem {
    fn from(notice: Notice) -> Self {
        Self {
            is_error: notice.is_error(),
            message: notice.message,
        }
    }
}

/// Opens `<db_dir>/user.db` and starts the initial list load in background.
///
/// # FFI contract
/// - Sync call; opens and migrates the database file.
/// - Repeated calls with the same `db_dir` are no-ops.
/// - A different `db_dir` after a successful open is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_open(db_dir: String, editable_id: bool) -> String {
    let requested = PathBuf::from(db_dir.trim());
    if requested.as_os_str().is_empty() {
        return "db_dir cannot be empty".to_string();
    }

    if let Some(screen) = SCREEN.get() {
        return open_conflict(screen, &requested);
    }

    let screen = match build_screen(requested.clone(), editable_id) {
        Ok(screen) => screen,
        Err(err) => return err,
    };
    let screen = match SCREEN.set(screen) {
        Ok(()) => SCREEN.get(),
        // Lost a race with another opener; keep the winner.
        Err(_) => return SCREEN.get().map_or_else(String::new, |s| open_conflict(s, &requested)),
    };

    if let Some(screen) = screen {
        let _guard = screen.runtime.enter();
        let _initial_load = screen.controller.launch(ScreenCommand::Initialize);
        info!(
            "event=screen_open module=ffi status=ok db_dir={}",
            screen.db_dir.display()
        );
    }
    String::new()
}

/// Returns the current screen state.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Returns an empty view before `screen_open`.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_snapshot() -> ScreenView {
    let Some(screen) = SCREEN.get() else {
        return ScreenView {
            id_field: String::new(),
            id_editable: false,
            first_name: String::new(),
            last_name: String::new(),
            selected_uid: None,
            users: Vec::new(),
        };
    };

    let state = screen.controller.snapshot();
    ScreenView {
        id_field: state.id_field,
        id_editable: screen.controller.config().id_field_mode == IdFieldMode::Editable,
        first_name: state.first_name,
        last_name: state.last_name,
        selected_uid: state.selected,
        users: state.users.into_iter().map(to_user_item).collect(),
    }
}

/// Updates the first-name input. Returns error message or empty string.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_set_first_name(value: String) -> String {
    with_screen(|screen| {
        screen.controller.set_first_name(value);
        Ok(())
    })
}

/// Updates the last-name input. Returns error message or empty string.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_set_last_name(value: String) -> String {
    with_screen(|screen| {
        screen.controller.set_last_name(value);
        Ok(())
    })
}

/// Updates the id input; fails when the screen was opened read-only.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_set_id_field(value: String) -> String {
    with_screen(|screen| {
        screen
            .controller
            .set_id_field(value)
            .map_err(|err| err.to_string())
    })
}

/// Selects a row of the currently loaded list by id.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_select(uid: i64) -> String {
    with_screen(|screen| {
        let users = screen.controller.snapshot().users;
        let user = users
            .iter()
            .find(|user| user.uid == uid)
            .ok_or_else(|| format!("user {uid} is not in the loaded list"))?;
        screen.controller.select(user);
        Ok(())
    })
}

/// Adds a user from the name inputs.
///
/// # FFI contract
/// - Async from Dart; blocks a bridge worker thread, never the UI thread.
/// - Never panics; failures come back as error notices.
pub fn screen_add() -> NoticeItem {
    run_command(ScreenCommand::Add)
}

/// Reloads the user list and clears the inputs.
pub fn screen_list() -> NoticeItem {
    run_command(ScreenCommand::Load)
}

/// Deletes the selected user (or the typed id when editable).
pub fn screen_delete() -> NoticeItem {
    run_command(ScreenCommand::Delete)
}

/// Returns notices produced by background commands since the last call.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_drain_notices() -> Vec<NoticeItem> {
    let Some(screen) = SCREEN.get() else {
        return Vec::new();
    };
    let mut receiver = screen
        .notices
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let mut drained = Vec::new();
    while let Ok(notice) = receiver.try_recv() {
        drained.push(NoticeItem::from(notice));
    }
    drained
}

fn build_screen(db_dir: PathBuf, editable_id: bool) -> Result<FfiScreen, String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("userdesk-screen")
        .enable_all()
        .build()
        .map_err(|err| format!("screen runtime start failed: {err}"))?;
    let store = UserStore::open_in_dir(&db_dir)
        .map_err(|err| format!("user DB open failed: {err}"))?;
    let config = ScreenConfig {
        id_field_mode: if editable_id {
            IdFieldMode::Editable
        } else {
            IdFieldMode::ReadOnly
        },
    };
    let (controller, notices) = ScreenController::new(store, config);
    Ok(FfiScreen {
        runtime,
        controller,
        db_dir,
        notices: Mutex::new(notices),
    })
}

fn open_conflict(screen: &FfiScreen, requested: &Path) -> String {
    if screen.db_dir == requested {
        return String::new();
    }
    warn!(
        "event=screen_open module=ffi status=rejected active_dir={} requested_dir={}",
        screen.db_dir.display(),
        requested.display()
    );
    format!(
        "screen already open at `{}`; refusing to switch to `{}`",
        screen.db_dir.display(),
        requested.display()
    )
}

fn with_screen(f: impl FnOnce(&FfiScreen) -> Result<(), String>) -> String {
    match SCREEN.get() {
        Some(screen) => f(screen).err().unwrap_or_default(),
        None => NOT_OPEN_MESSAGE.to_string(),
    }
}

fn run_command(command: ScreenCommand) -> NoticeItem {
    let Some(screen) = SCREEN.get() else {
        return NoticeItem {
            is_error: true,
            message: NOT_OPEN_MESSAGE.to_string(),
        };
    };
    match screen.runtime.block_on(screen.controller.run(command)) {
        Some(notice) => NoticeItem::from(notice),
        None => NoticeItem {
            is_error: false,
            message: String::new(),
        },
    }
}

fn to_user_item(user: User) -> UserItem {
    UserItem {
        label: user.display_label(),
        uid: user.uid,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}
