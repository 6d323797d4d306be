use preludio_storage::{FileStore, KeyValueStore, StorageError};
use tempfile::TempDir;

#[test]
fn test_set_and_get_entry() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    store
        .set_string("preludio_player_state", r#"{"version":1}"#)
        .unwrap();

    let value = store.get_string("preludio_player_state").unwrap();
    assert_eq!(value.as_deref(), Some(r#"{"version":1}"#));
    assert!(dir.path().join("preludio_player_state.json").exists());
}

#[test]
fn test_get_missing_entry() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    assert_eq!(store.get_string("nothing").unwrap(), None);
    assert!(!store.has_key("nothing").unwrap());
}

#[test]
fn test_root_created_on_first_write() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("state");
    let store = FileStore::new(&root);

    assert!(!root.exists());
    assert_eq!(store.get_string("k").unwrap(), None);
    store.set_string("k", "v").unwrap();
    assert!(root.is_dir());
    assert!(root.join("k.json").is_file());
}

#[test]
fn test_overwrite_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    store.set_string("k", "first").unwrap();
    store.set_string("k", "second").unwrap();

    assert_eq!(store.get_string("k").unwrap().as_deref(), Some("second"));
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["k.json".to_string()]);
}

#[test]
fn test_delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    store.set_string("k", "v").unwrap();
    store.delete("k").unwrap();
    store.delete("k").unwrap();

    assert_eq!(store.get_string("k").unwrap(), None);
}

#[test]
fn test_entries_survive_new_handle() {
    let dir = TempDir::new().unwrap();
    FileStore::new(dir.path()).set_string("k", "v").unwrap();

    let reopened = FileStore::new(dir.path());
    assert_eq!(reopened.get_string("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn test_invalid_key_rejected() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    let err = store.set_string("../outside", "v").unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey(_)));
}
