//! Integration tests for [`relay_storage::SqliteCollection`] and [`relay_storage::Storage`].
//!
//! Uses an in-memory SQLite database.

use std::sync::Arc;

use relay_core::{Message, RelayConfig, User};
use relay_storage::{
    Collection, Filter, FindOptions, Key, SqliteCollection, SqlitePoolManager, Storage,
    StorageError, UpsertOutcome, UserRecord, UserStore,
};
use serde_json::json;

async fn open(name: &str) -> SqliteCollection {
    let manager = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    SqliteCollection::open(manager.pool().clone(), name)
        .await
        .expect("Failed to open collection")
}

fn memory_config() -> RelayConfig {
    RelayConfig {
        operator_id: 1,
        database_url: "sqlite::memory:".to_string(),
        log_file: "logs/test.log".to_string(),
        reply_timeout_secs: 60,
        availability_window_secs: 300,
    }
}

/// **Test: Insert then find by key; missing keys yield `None`.**
#[tokio::test]
async fn test_insert_and_find_one() {
    let coll = open("users").await;
    let doc = json!({"id": 7, "first_name": "Ann", "blocked": false});

    coll.insert(&Key::Int(7), &doc).await.unwrap();

    assert_eq!(coll.find_one(&Key::Int(7)).await.unwrap(), Some(doc));
    assert_eq!(coll.find_one(&Key::Int(8)).await.unwrap(), None);
    assert_eq!(coll.name(), "users");
}

/// **Test: Inserting an existing key fails with `AlreadyExists`.**
#[tokio::test]
async fn test_duplicate_insert() {
    let coll = open("users").await;
    coll.insert(&Key::Int(1), &json!({"id": 1})).await.unwrap();

    let err = coll
        .insert(&Key::Int(1), &json!({"id": 1}))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::AlreadyExists(_)));
}

/// **Test: Upsert reports whether it inserted or replaced.**
#[tokio::test]
async fn test_upsert_outcome() {
    let coll = open("common").await;
    let key = Key::Text("abc".to_string());

    let first = coll.upsert(&key, &json!({"v": 1})).await.unwrap();
    let second = coll.upsert(&key, &json!({"v": 2})).await.unwrap();

    assert_eq!(first, UpsertOutcome::Inserted);
    assert_eq!(second, UpsertOutcome::Replaced);
    assert_eq!(coll.find_one(&key).await.unwrap(), Some(json!({"v": 2})));
    assert_eq!(coll.count(&Filter::all()).await.unwrap(), 1);
}

/// **Test: Integer keys sort numerically; skip/limit windows the sorted result.**
#[tokio::test]
async fn test_find_sorted_with_window() {
    let coll = open("users").await;
    for id in [10i64, 9, 100, 1, 55] {
        coll.insert(&Key::Int(id), &json!({"id": id})).await.unwrap();
    }

    let all = coll.find(&Filter::all(), FindOptions::default()).await.unwrap();
    let window = coll.find(&Filter::all(), FindOptions::page(1, 3)).await.unwrap();

    let ids = |docs: &[serde_json::Value]| docs.iter().map(|d| d["id"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ids(&all), vec![1, 9, 10, 55, 100]);
    assert_eq!(ids(&window), vec![9, 10, 55]);
}

/// **Test: Filters on booleans, integers and strings; missing fields never match.**
#[tokio::test]
async fn test_filters() {
    let coll = open("messages").await;
    coll.insert(&Key::Int(1), &json!({"blocked": true, "with": 5, "short_id": "-----Eh"}))
        .await
        .unwrap();
    coll.insert(&Key::Int(2), &json!({"blocked": false, "with": 5, "short_id": "-----Ei"}))
        .await
        .unwrap();
    coll.insert(&Key::Int(3), &json!({"with": 6})).await.unwrap();

    assert_eq!(coll.count(&Filter::all()).await.unwrap(), 3);
    assert_eq!(coll.count(&Filter::all().eq("blocked", true)).await.unwrap(), 1);
    assert_eq!(coll.count(&Filter::all().eq("blocked", false)).await.unwrap(), 1);
    assert_eq!(coll.count(&Filter::all().eq("with", 5i64)).await.unwrap(), 2);
    assert_eq!(
        coll.count(&Filter::all().eq("with", 5i64).eq("short_id", "-----Ei"))
            .await
            .unwrap(),
        1
    );

    let found = coll
        .find(&Filter::all().eq("short_id", "-----Eh"), FindOptions::page(0, 1))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["blocked"], true);
}

/// **Test: Delete reports whether a document existed.**
#[tokio::test]
async fn test_delete() {
    let coll = open("users").await;
    coll.insert(&Key::Int(1), &json!({"id": 1})).await.unwrap();

    assert!(coll.delete(&Key::Int(1)).await.unwrap());
    assert!(!coll.delete(&Key::Int(1)).await.unwrap());
    assert_eq!(coll.count(&Filter::all()).await.unwrap(), 0);
}

/// **Test: Collection names that are not plain identifiers are a config error.**
#[tokio::test]
async fn test_invalid_collection_name() {
    let manager = SqlitePoolManager::new("sqlite::memory:").await.unwrap();

    let result = SqliteCollection::open(manager.pool().clone(), "users; DROP TABLE x").await;

    assert!(matches!(result, Err(StorageError::Config(_))));
}

/// **Test: A user store over SQLite keeps its count across reopen.**
#[tokio::test]
async fn test_user_store_over_sqlite() {
    let manager = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
    let coll = SqliteCollection::open(manager.pool().clone(), "users").await.unwrap();
    let store = UserStore::open(Arc::new(coll.clone())).await.unwrap();
    for id in 1..=6 {
        let mut record = UserRecord::from_user(&User::new(id, "U"));
        record.blocked = id % 3 == 0;
        store.create(&record).await.unwrap();
    }

    let reopened = UserStore::open(Arc::new(coll)).await.unwrap();
    let blocked = reopened.get_blocked_page(1, 5).await.unwrap();
    let unblocked = reopened.get_page(1, 5).await.unwrap();

    assert_eq!(reopened.count(), 6);
    assert_eq!(blocked.records.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 6]);
    assert_eq!(unblocked.total_pages, 1);
    assert_eq!(unblocked.records.len(), 4);
}

/// **Test: Storage bundle end to end over SQLite.**
///
/// **Setup:** `Storage::open` on an in-memory database.
/// **Action:** Record 7 messages for one user, page through them, save a template.
/// **Expected:** 2 pages of 4 + 3; short-id lookup works; template persists in `common`.
#[tokio::test]
async fn test_storage_end_to_end() {
    let mut storage = Storage::open(&memory_config()).await.unwrap();
    let user = User::new(5, "Eve");
    storage
        .users
        .create(&UserRecord::from_user(&user))
        .await
        .unwrap();

    let mut recorded = Vec::new();
    for i in 0..7 {
        let message = Message::text(i, user.clone(), format!("m{}", i));
        recorded.push(storage.messages.record(&message).await.unwrap());
    }

    let first = storage.messages.get_page_with(5, 1, 4).await.unwrap();
    let last = storage.messages.get_page_with(5, 0, 4).await.unwrap();
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.records.len(), 4);
    assert_eq!(last.records.len(), 3);
    assert_eq!(last.records[2].text, "m6");

    let by_short = storage
        .messages
        .get_by_short_id(recorded[3].short_id.as_str())
        .await
        .unwrap();
    assert!(by_short.is_some());

    storage.shared.set_template("start", "Welcome");
    storage.shared.save().await.unwrap();
    assert_eq!(storage.shared.start_template(), Some("Welcome"));
    assert_eq!(storage.users.count(), 1);
    assert_eq!(storage.messages.count(), 7);
}
