use crate::model::user::{User, UserId};

/// Whether the host lets the user type into the id field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdFieldMode {
    /// Id is only filled by selecting a row.
    #[default]
    ReadOnly,
    /// Id can be typed and is used as the delete target when nothing is selected.
    Editable,
}

/// Host-provided screen options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenConfig {
    pub id_field_mode: IdFieldMode,
}

/// Snapshot of everything the screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenState {
    /// Text of the id field (empty when nothing is selected).
    pub id_field: String,
    pub first_name: String,
    pub last_name: String,
    /// Row picked from the list, if any.
    pub selected: Option<UserId>,
    /// Users as of the last load.
    pub users: Vec<User>,
}

impl ScreenState {
    pub(crate) fn clear_input(&mut self) {
        self.id_field.clear();
        self.first_name.clear();
        self.last_name.clear();
        self.selected = None;
    }

    pub(crate) fn select(&mut self, user: &User) {
        self.selected = Some(user.uid);
        self.id_field = user.uid.to_string();
        self.first_name = user.first_name.clone();
        self.last_name = user.last_name.clone();
    }

    /// Selection first, then the id field parsed as an integer.
    pub(crate) fn delete_target(&self) -> Option<UserId> {
        self.selected
            .or_else(|| self.id_field.trim().parse::<UserId>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::ScreenState;
    use crate::model::user::User;

    fn ana() -> User {
        User {
            uid: 3,
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
        }
    }

    #[test]
    fn select_fills_fields_and_clear_input_keeps_list() {
        let mut state = ScreenState {
            users: vec![ana()],
            ..ScreenState::default()
        };
        state.select(&ana());
        assert_eq!(state.id_field, "3");
        assert_eq!(state.first_name, "Ana");
        assert_eq!(state.selected, Some(3));

        state.clear_input();
        assert!(state.id_field.is_empty());
        assert!(state.first_name.is_empty());
        assert_eq!(state.selected, None);
        assert_eq!(state.users.len(), 1);
    }

    #[test]
    fn delete_target_prefers_selection_over_id_field() {
        let mut state = ScreenState::default();
        assert_eq!(state.delete_target(), None);

        state.id_field = " 12 ".to_string();
        assert_eq!(state.delete_target(), Some(12));

        state.id_field = "twelve".to_string();
        assert_eq!(state.delete_target(), None);

        state.selected = Some(5);
        assert_eq!(state.delete_target(), Some(5));
    }
}
