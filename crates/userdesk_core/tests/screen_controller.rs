use std::time::Duration;
use userdesk_core::{
    IdFieldMode, NoticeLevel, ScreenCommand, ScreenConfig, ScreenController, ScreenError,
    ScreenOutcome, User, UserStore, UserValidationError,
};

fn controller(mode: IdFieldMode) -> (ScreenController, UserStore) {
    let store = UserStore::open_in_memory().unwrap();
    let (controller, _notices) = ScreenController::new(
        store.clone(),
        ScreenConfig {
            id_field_mode: mode,
        },
    );
    (controller, store)
}

async fn seed(store: &UserStore, first: &str, last: &str) -> i64 {
    store.insert(User::new(first, last).unwrap()).await.unwrap()
}

#[tokio::test]
async fn add_with_valid_names_persists_reloads_and_clears_input() {
    let (screen, store) = controller(IdFieldMode::ReadOnly);
    screen.set_first_name("  Ana ");
    screen.set_last_name("Lopez");

    let outcome = screen.add().await.unwrap();
    let ScreenOutcome::Added { uid } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_ne!(uid, 0);

    let stored = store.list_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].first_name, "Ana");
    assert_eq!(stored[0].last_name, "Lopez");

    let state = screen.snapshot();
    assert_eq!(state.users, stored);
    assert!(state.first_name.is_empty());
    assert!(state.last_name.is_empty());
    assert!(state.id_field.is_empty());
    assert_eq!(state.selected, None);
}

#[tokio::test]
async fn add_with_blank_name_is_rejected_before_store() {
    let (screen, store) = controller(IdFieldMode::ReadOnly);
    screen.set_first_name("Ana");
    screen.set_last_name("   ");

    let err = screen.add().await.unwrap_err();
    assert!(matches!(
        err,
        ScreenError::Validation(UserValidationError::BlankLastName)
    ));
    assert!(store.list_all().await.unwrap().is_empty());

    let state = screen.snapshot();
    assert_eq!(state.first_name, "Ana");
    assert_eq!(state.last_name, "   ");

    screen.set_first_name("");
    screen.set_last_name("Lopez");
    let err = screen.add().await.unwrap_err();
    assert!(matches!(
        err,
        ScreenError::Validation(UserValidationError::BlankFirstName)
    ));
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn load_replaces_list_and_clears_input_and_selection() {
    let (screen, store) = controller(IdFieldMode::ReadOnly);
    seed(&store, "Ana", "Lopez").await;
    seed(&store, "Luis", "Perez").await;

    screen.initialize().await.unwrap();
    let listed = screen.snapshot().users;
    screen.select(&listed[0]);
    screen.set_last_name("edited");

    let outcome = screen.load().await.unwrap();
    assert_eq!(outcome, ScreenOutcome::Loaded { count: 2 });

    let state = screen.snapshot();
    assert_eq!(state.users.len(), 2);
    assert_eq!(state.selected, None);
    assert!(state.id_field.is_empty());
    assert!(state.last_name.is_empty());
}

#[tokio::test]
async fn initialize_keeps_pending_input() {
    let (screen, store) = controller(IdFieldMode::ReadOnly);
    seed(&store, "Ana", "Lopez").await;
    screen.set_first_name("draft");

    let outcome = screen.initialize().await.unwrap();
    assert_eq!(outcome, ScreenOutcome::Initialized { count: 1 });

    let state = screen.snapshot();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.first_name, "draft");
}

#[tokio::test]
async fn select_populates_fields_with_record_values() {
    let (screen, store) = controller(IdFieldMode::ReadOnly);
    let uid = seed(&store, "Ana", "Lopez").await;
    screen.initialize().await.unwrap();

    let target = screen.snapshot().users[0].clone();
    screen.select(&target);

    let state = screen.snapshot();
    assert_eq!(state.selected, Some(uid));
    assert_eq!(state.id_field, uid.to_string());
    assert_eq!(state.first_name, "Ana");
    assert_eq!(state.last_name, "Lopez");
}

#[tokio::test]
async fn select_then_delete_removes_selected_regardless_of_id_field() {
    let (screen, store) = controller(IdFieldMode::Editable);
    let keep = seed(&store, "Ana", "Lopez").await;
    let remove = seed(&store, "Luis", "Perez").await;
    screen.initialize().await.unwrap();

    let target = screen
        .snapshot()
        .users
        .into_iter()
        .find(|user| user.uid == remove)
        .unwrap();
    screen.select(&target);
    screen.set_id_field(keep.to_string()).unwrap();
    assert_eq!(screen.snapshot().selected, Some(remove));

    let outcome = screen.delete().await.unwrap();
    assert_eq!(outcome, ScreenOutcome::Deleted { uid: remove });

    let stored: Vec<_> = store.list_all().await.unwrap().into_iter().map(|u| u.uid).collect();
    assert_eq!(stored, vec![keep]);

    let state = screen.snapshot();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.users[0].uid, keep);
    assert_eq!(state.selected, None);
    assert!(state.id_field.is_empty());
}

#[tokio::test]
async fn delete_uses_typed_id_when_nothing_is_selected() {
    let (screen, store) = controller(IdFieldMode::Editable);
    let uid = seed(&store, "Ana", "Lopez").await;
    screen.initialize().await.unwrap();

    screen.set_id_field(uid.to_string()).unwrap();
    screen.delete().await.unwrap();

    assert!(store.list_all().await.unwrap().is_empty());
    assert!(screen.snapshot().users.is_empty());
}

#[tokio::test]
async fn delete_with_unknown_typed_id_is_a_noop_on_store() {
    let (screen, store) = controller(IdFieldMode::Editable);
    let uid = seed(&store, "Ana", "Lopez").await;
    screen.initialize().await.unwrap();

    screen.set_id_field((uid + 50).to_string()).unwrap();
    let outcome = screen.delete().await.unwrap();

    assert_eq!(outcome, ScreenOutcome::Deleted { uid: uid + 50 });
    assert_eq!(store.list_all().await.unwrap().len(), 1);
    assert_eq!(screen.snapshot().users.len(), 1);
}

#[tokio::test]
async fn delete_without_selection_and_non_numeric_id_is_rejected() {
    let (screen, store) = controller(IdFieldMode::Editable);
    seed(&store, "Ana", "Lopez").await;
    screen.initialize().await.unwrap();
    screen.set_id_field("abc").unwrap();

    let err = screen.delete().await.unwrap_err();
    assert!(matches!(err, ScreenError::NoDeleteTarget));
    assert!(err.is_validation());
    assert_eq!(store.list_all().await.unwrap().len(), 1);
    assert_eq!(screen.snapshot().id_field, "abc");
}

#[tokio::test]
async fn read_only_id_field_rejects_edits() {
    let (screen, _store) = controller(IdFieldMode::ReadOnly);

    let err = screen.set_id_field("3").unwrap_err();
    assert!(matches!(err, ScreenError::IdFieldReadOnly));
    assert!(screen.snapshot().id_field.is_empty());

    let err = screen.delete().await.unwrap_err();
    assert!(matches!(err, ScreenError::NoDeleteTarget));
}

#[tokio::test]
async fn storage_failure_becomes_error_notice_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::open_in_dir(dir.path()).unwrap();
    let (screen, _notices) = ScreenController::new(store, ScreenConfig::default());
    screen.set_first_name("Ana");
    screen.set_last_name("Lopez");

    let raw = rusqlite::Connection::open(dir.path().join("user.db")).unwrap();
    raw.execute_batch("DROP TABLE User;").unwrap();

    let before = screen.snapshot();
    let notice = screen.run(ScreenCommand::Add).await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.starts_with("Could not add users"));
    assert_eq!(screen.snapshot(), before);
}

#[tokio::test]
async fn run_maps_outcomes_to_notices() {
    let (screen, _store) = controller(IdFieldMode::ReadOnly);

    assert_eq!(screen.run(ScreenCommand::Initialize).await, None);

    let refreshed = screen.run(ScreenCommand::Load).await.unwrap();
    assert_eq!(refreshed.message, "List refreshed");

    let missing = screen.run(ScreenCommand::Add).await.unwrap();
    assert!(missing.is_error());
    assert_eq!(missing.message, "Fill in all fields");

    let no_target = screen.run(ScreenCommand::Delete).await.unwrap();
    assert_eq!(no_target.message, "Select a user");

    screen.set_first_name("Ana");
    screen.set_last_name("Lopez");
    let added = screen.run(ScreenCommand::Add).await.unwrap();
    assert_eq!(added.level, NoticeLevel::Info);
    assert_eq!(added.message, "User added");
}

#[tokio::test]
async fn launched_commands_deliver_notices_on_channel() {
    let store = UserStore::open_in_memory().unwrap();
    let (screen, mut notices) = ScreenController::new(store.clone(), ScreenConfig::default());
    screen.set_first_name("Ana");
    screen.set_last_name("Lopez");

    screen.launch(ScreenCommand::Add).await.unwrap();

    let notice = tokio::time::timeout(Duration::from_secs(5), notices.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notice.message, "User added");
    assert_eq!(screen.snapshot().users.len(), 1);

    screen.launch(ScreenCommand::Initialize).await.unwrap();
    assert!(notices.try_recv().is_err());
}

fn drop_user_table(dir: &std::path::Path) {
    let raw = rusqlite::Connection::open(dir.join("user.db")).unwrap();
    raw.execute_batch("DROP TABLE User;").unwrap();
}

#[tokio::test]
async fn delete_storage_failure_keeps_list_input_and_selection() {
    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::open_in_dir(dir.path()).unwrap();
    seed(&store, "Ana", "Lopez").await;
    let (screen, _notices) = ScreenController::new(store, ScreenConfig::default());
    screen.initialize().await.unwrap();
    let target = screen.snapshot().users[0].clone();
    screen.select(&target);

    drop_user_table(dir.path());

    let before = screen.snapshot();
    let notice = screen.run(ScreenCommand::Delete).await.unwrap();
    assert!(notice.is_error());
    assert!(notice.message.starts_with("Could not delete users"));

    let after = screen.snapshot();
    assert_eq!(after, before);
    assert_eq!(after.selected, Some(target.uid));
    assert_eq!(after.users, vec![target]);
}

#[tokio::test]
async fn load_storage_failure_keeps_previous_list_and_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::open_in_dir(dir.path()).unwrap();
    seed(&store, "Ana", "Lopez").await;
    seed(&store, "Luis", "Perez").await;
    let (screen, _notices) = ScreenController::new(store, ScreenConfig::default());
    screen.initialize().await.unwrap();
    screen.set_first_name("draft");

    drop_user_table(dir.path());

    let before = screen.snapshot();
    let notice = screen.run(ScreenCommand::Load).await.unwrap();
    assert!(notice.is_error());
    assert!(notice.message.starts_with("Could not load users"));

    let after = screen.snapshot();
    assert_eq!(after, before);
    assert_eq!(after.users.len(), 2);
    assert_eq!(after.first_name, "draft");
}
