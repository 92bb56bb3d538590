//! Key-value persistence contract shared by the archive and reminder stores.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::PersistError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] crate::database::DatabaseError),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string store with a single global key namespace.
///
/// `set` replaces the whole value; there are no transactions spanning calls.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read a JSON list stored under `key`, empty if the key is absent or blank
pub async fn read_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, PersistError> {
    match store.get(key).await? {
        Some(stored) if stored.is_empty() => Ok(Vec::new()),
        Some(stored) => Ok(serde_json::from_str(&stored)?),
        None => Ok(Vec::new()),
    }
}

/// Serialize the full list and overwrite `key`
pub async fn write_list<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), PersistError> {
    let json = serde_json::to_string(items)?;
    store.set(key, &json).await?;
    Ok(())
}

/// In-process store, useful for ephemeral sessions and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail until switched off again
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a raw value, bypassing the write switch
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".to_string())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("write to '{}' rejected", key)));
        }
        self.insert_raw(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Reminder, ReminderTime};

    fn message(id: &str) -> Message {
        Message::new(
            id.to_string(),
            format!("text {}", id),
            "Faith".to_string(),
            "2024-01-01".to_string(),
        )
    }

    #[tokio::test]
    async fn missing_key_reads_as_empty_list() {
        let store = MemoryStore::new();
        let list: Vec<Message> = read_list(&store, "nothing").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn list_roundtrips_through_store() {
        let store = MemoryStore::new();
        let mut favorite = message("B");
        favorite.is_favorite = Some(true);
        let items = vec![message("A"), favorite];

        write_list(&store, "k", &items).await.unwrap();
        let back: Vec<Message> = read_list(&store, "k").await.unwrap();
        assert_eq!(back, items);
    }

    #[tokio::test]
    async fn empty_stored_value_reads_as_empty_list() {
        let store = MemoryStore::new();
        store.insert_raw("daily_reminders", "").unwrap();
        let list: Vec<Reminder> = read_list(&store, "daily_reminders").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn reminder_list_roundtrips_through_store() {
        let store = MemoryStore::new();
        let mut paused = Reminder::new(
            "1700000000001".to_string(),
            String::new(),
            ReminderTime::new(18, 30).unwrap(),
            vec![0, 6],
        );
        paused.enabled = false;
        let items = vec![
            Reminder::new(
                "1700000000000".to_string(),
                "2024-01-01T06:00:00+03:00".to_string(),
                ReminderTime::new(7, 5).unwrap(),
                vec![1, 3, 5],
            ),
            paused,
        ];

        write_list(&store, "daily_reminders", &items).await.unwrap();
        let raw = store.get("daily_reminders").await.unwrap().unwrap();
        assert!(raw.contains(r#""time":"07:05""#));

        let back: Vec<Reminder> = read_list(&store, "daily_reminders").await.unwrap();
        assert_eq!(back, items);
        assert!(back[0].enabled);
        assert!(!back[1].enabled);
    }

    #[tokio::test]
    async fn malformed_value_is_reported() {
        let store = MemoryStore::new();
        store.insert_raw("k", "{not json").unwrap();
        let result: Result<Vec<Message>, _> = read_list(&store, "k").await;
        assert!(matches!(result, Err(PersistError::Malformed(_))));
    }

    #[tokio::test]
    async fn failing_writes_leave_previous_value() {
        let store = MemoryStore::new();
        store.set("k", "1").await.unwrap();
        store.set_fail_writes(true);
        assert!(store.set("k", "2").await.is_err());
        store.set_fail_writes(false);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("1"));
    }
}
