use crate::infrastructure::storage::file::FilePreferenceStore;
use crate::infrastructure::storage::in_memory::InMemoryPreferenceStore;
use crate::infrastructure::storage::{PreferenceStore, current_user_key};
use tempfile::tempdir;

#[test]
fn test_current_user_key_is_per_group() {
    assert_eq!(current_user_key(12), "fairshare:group:12:current-user-id");
}

#[tokio::test]
async fn test_in_memory_store() {
    let store = InMemoryPreferenceStore::new();
    assert_eq!(store.get("a").await.unwrap(), None);

    store.set("a", "1").await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

    store.remove("a").await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("preferences.json");

    let store = FilePreferenceStore::new(&path);
    assert_eq!(store.get(&current_user_key(1)).await.unwrap(), None);
    store.set(&current_user_key(1), "3").await.unwrap();
    store.set(&current_user_key(2), "5").await.unwrap();

    let reopened = FilePreferenceStore::new(&path);
    assert_eq!(reopened.get(&current_user_key(1)).await.unwrap().as_deref(), Some("3"));

    reopened.remove(&current_user_key(1)).await.unwrap();
    assert_eq!(store.get(&current_user_key(1)).await.unwrap(), None);
    assert_eq!(store.get(&current_user_key(2)).await.unwrap().as_deref(), Some("5"));
}

#[tokio::test]
async fn test_file_store_ignores_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = FilePreferenceStore::new(&path);
    assert_eq!(store.get("anything").await.unwrap(), None);

    store.set("anything", "1").await.unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(saved["anything"], "1");
}
