use super::notice::{Notice, ScreenCommand, ScreenOutcome};
use super::state::{IdFieldMode, ScreenConfig, ScreenState};
use crate::model::user::{User, UserValidationError};
use crate::store::{StorageError, UserStore};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Failure of a screen command.
#[derive(Debug)]
pub enum ScreenError {
    /// A required name field is blank.
    Validation(UserValidationError),
    /// Delete found neither a selection nor a numeric id field.
    NoDeleteTarget,
    /// The id field was edited while configured read-only.
    IdFieldReadOnly,
    /// The record store failed.
    Storage(StorageError),
}

impl ScreenError {
    /// Returns whether the command was rejected before reaching the store.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// Text shown to the user for this failure.
    pub fn notice_message(&self, command: ScreenCommand) -> String {
        match self {
            Self::Validation(_) => "Fill in all fields".to_string(),
            Self::NoDeleteTarget => "Select a user".to_string(),
            Self::IdFieldReadOnly => "The id field is read-only".to_string(),
            Self::Storage(err) => format!("Could not {} users: {err}", command.label()),
        }
    }
}

impl Display for ScreenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoDeleteTarget => write!(f, "no user selected and id field is not a number"),
            Self::IdFieldReadOnly => write!(f, "id field is read-only"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScreenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NoDeleteTarget | Self::IdFieldReadOnly => None,
        }
    }
}

impl From<UserValidationError> for ScreenError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for ScreenError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Stateful mediator between screen events and the `UserStore`.
///
/// Clones share the same state, store and notice channel, so a clone can be
/// moved into a background task.
#[derive(Clone)]
pub struct ScreenController {
    store: UserStore,
    config: ScreenConfig,
    state: Arc<Mutex<ScreenState>>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl ScreenController {
    /// Creates a controller with empty state.
    ///
    /// Notices from launched commands arrive on the returned receiver.
    pub fn new(store: UserStore, config: ScreenConfig) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            store,
            config,
            state: Arc::new(Mutex::new(ScreenState::default())),
            notices,
        };
        (controller, receiver)
    }

    pub fn config(&self) -> ScreenConfig {
        self.config
    }

    /// Returns a copy of the current screen state.
    pub fn snapshot(&self) -> ScreenState {
        self.lock_state().clone()
    }

    pub fn set_first_name(&self, value: impl Into<String>) {
        self.lock_state().first_name = value.into();
    }

    pub fn set_last_name(&self, value: impl Into<String>) {
        self.lock_state().last_name = value.into();
    }

    /// Edits the id field; rejected when the field is read-only.
    ///
    /// A selection stays in place and still wins as the delete target.
    pub fn set_id_field(&self, value: impl Into<String>) -> Result<(), ScreenError> {
        if self.config.id_field_mode == IdFieldMode::ReadOnly {
            return Err(ScreenError::IdFieldReadOnly);
        }
        self.lock_state().id_field = value.into();
        Ok(())
    }

    /// Copies a listed user into the input fields and marks it selected.
    pub fn select(&self, user: &User) {
        self.lock_state().select(user);
        debug!("event=screen_select module=screen status=ok uid={}", user.uid);
    }

    /// Replaces the list without touching input fields.
    pub async fn initialize(&self) -> Result<ScreenOutcome, ScreenError> {
        let users = self.store.list_all().await?;
        let count = users.len();
        self.lock_state().users = users;
        Ok(ScreenOutcome::Initialized { count })
    }

    /// Reloads the list and clears input and selection.
    pub async fn load(&self) -> Result<ScreenOutcome, ScreenError> {
        let users = self.store.list_all().await?;
        let count = users.len();
        let mut state = self.lock_state();
        state.users = users;
        state.clear_input();
        Ok(ScreenOutcome::Loaded { count })
    }

    /// Inserts a user built from the trimmed name fields, then reloads.
    pub async fn add(&self) -> Result<ScreenOutcome, ScreenError> {
        let user = {
            let state = self.lock_state();
            User::new(&state.first_name, &state.last_name)?
        };

        let uid = self.store.insert(user).await?;
        let users = self.store.list_all().await?;

        let mut state = self.lock_state();
        state.users = users;
        state.clear_input();
        Ok(ScreenOutcome::Added { uid })
    }

    /// Deletes the selected user, or the id typed in the id field.
    pub async fn delete(&self) -> Result<ScreenOutcome, ScreenError> {
        let target = self
            .lock_state()
            .delete_target()
            .ok_or(ScreenError::NoDeleteTarget)?;

        self.store.delete_by_id(target).await?;

        let mut state = self.lock_state();
        state.users.retain(|user| user.uid != target);
        state.clear_input();
        Ok(ScreenOutcome::Deleted { uid: target })
    }

    /// Runs one command and converts its result into a notice.
    ///
    /// Failures are logged here and never returned.
    pub async fn run(&self, command: ScreenCommand) -> Option<Notice> {
        let result = match command {
            ScreenCommand::Initialize => self.initialize().await,
            ScreenCommand::Load => self.load().await,
            ScreenCommand::Add => self.add().await,
            ScreenCommand::Delete => self.delete().await,
        };

        match result {
            Ok(outcome) => {
                info!(
                    "event=screen_command module=screen status=ok command={} outcome={:?}",
                    command.label(),
                    outcome
                );
                Notice::for_outcome(outcome)
            }
            Err(err) if err.is_validation() => {
                warn!(
                    "event=screen_command module=screen status=rejected command={} error={}",
                    command.label(),
                    err
                );
                Some(Notice::error(err.notice_message(command)))
            }
            Err(err) => {
                error!(
                    "event=screen_command module=screen status=error command={} error={}",
                    command.label(),
                    err
                );
                Some(Notice::error(err.notice_message(command)))
            }
        }
    }

    /// Runs `command` as a detached task; its notice goes to the channel.
    ///
    /// Must be called inside a tokio runtime.
    pub fn launch(&self, command: ScreenCommand) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            if let Some(notice) = controller.run(command).await {
                if controller.notices.send(notice).is_err() {
                    debug!(
                        "event=screen_notice module=screen status=dropped command={}",
                        command.label()
                    );
                }
            }
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, ScreenState> {
        // State is plain data; a panic mid-update cannot break its invariants.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
