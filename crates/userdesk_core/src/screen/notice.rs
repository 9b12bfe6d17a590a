use crate::model::user::UserId;

/// Actions a user can trigger on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    /// First load when the screen opens; keeps input fields and shows no notice.
    Initialize,
    /// Refresh the list and clear input.
    Load,
    Add,
    Delete,
}

impl ScreenCommand {
    pub fn label(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Load => "load",
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

/// Successful result of a screen command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    Initialized { count: usize },
    Loaded { count: usize },
    Added { uid: UserId },
    Deleted { uid: UserId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message shown to the user after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a successful outcome; the initial load is silent.
    pub fn for_outcome(outcome: ScreenOutcome) -> Option<Self> {
        match outcome {
            ScreenOutcome::Initialized { .. } => None,
            ScreenOutcome::Loaded { .. } => Some(Self::info("List refreshed")),
            ScreenOutcome::Added { .. } => Some(Self::info("User added")),
            ScreenOutcome::Deleted { .. } => Some(Self::info("User deleted")),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
