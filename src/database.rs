use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::notifications::{NotificationContent, ScheduledNotification, Trigger};
use crate::storage::{KeyValueStore, StorageError};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Failed to encode trigger: {0}")]
    TriggerEncodingError(#[from] serde_json::Error),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
    #[error("Blocking database task failed: {0}")]
    TaskError(String),
}

/// SQLite-backed key-value store and trigger table.
///
/// Cloning shares the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        Self::initialize_schema(&conn)?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS scheduled_notifications (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                identifier      TEXT NOT NULL,
                title           TEXT NOT NULL,
                body            TEXT NOT NULL,
                trigger_rule    TEXT NOT NULL,
                created_at      TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scheduled_identifier ON scheduled_notifications(identifier)",
            [],
        )?;

        Ok(())
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&*conn)
    }

    /// Run a synchronous database call on the blocking thread pool
    pub(crate) async fn blocking<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DatabaseError::TaskError(e.to_string()))?
    }

    /// Get a stored value by key
    pub fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    rusqlite::params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    /// Insert or replace the whole value stored under a key
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![
                    key,
                    value,
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
                ],
            )?;
            Ok(())
        })
    }

    /// Insert a scheduled notification and return its ID
    pub fn insert_scheduled_notification(
        &self,
        notification: &ScheduledNotification,
    ) -> Result<i64, DatabaseError> {
        let trigger = serde_json::to_string(&notification.trigger)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO scheduled_notifications (identifier, title, body, trigger_rule, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    notification.identifier,
                    notification.content.title,
                    notification.content.body,
                    trigger,
                    notification.created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Get all scheduled notifications ordered by ID
    pub fn get_all_scheduled_notifications(
        &self,
    ) -> Result<Vec<ScheduledNotification>, DatabaseError> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, identifier, title, body, trigger_rule, created_at
                 FROM scheduled_notifications ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter()
            .map(|(id, identifier, title, body, trigger, created_at)| {
                let trigger: Trigger = serde_json::from_str(&trigger)?;
                Ok(ScheduledNotification {
                    id: Some(id),
                    identifier,
                    content: NotificationContent { title, body },
                    trigger,
                    created_at,
                })
            })
            .collect()
    }

    /// Delete every scheduled notification registered under an identifier
    pub fn delete_scheduled_notifications(&self, identifier: &str) -> Result<usize, DatabaseError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let removed = tx.execute(
                "DELETE FROM scheduled_notifications WHERE identifier = ?1",
                rusqlite::params![identifier],
            )?;
            tx.commit()?;
            Ok(removed)
        })
    }

    /// Delete all scheduled notifications
    pub fn delete_all_scheduled_notifications(&self) -> Result<usize, DatabaseError> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM scheduled_notifications", [])?))
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        Ok(self.blocking(move |db| db.get_value(&key)).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        let value = value.to_string();
        Ok(self.blocking(move |db| db.set_value(&key, &value)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_value_overwrites_previous_value() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_value("k").unwrap(), None);
        db.set_value("k", "first").unwrap();
        db.set_value("k", "second").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn new_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        db.set_value("k", "v").unwrap();
        assert!(path.exists());

        // A second handle on the same file sees the data
        let reopened = Database::new(path.to_str().unwrap()).unwrap();
        assert_eq!(reopened.get_value("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn scheduled_notifications_delete_by_identifier() {
        let db = Database::open_in_memory().unwrap();
        let content = NotificationContent::new("t", "b");
        for day in [1, 3, 5] {
            let trigger = Trigger::weekly_for_day(day, 9, 0).unwrap();
            db.insert_scheduled_notification(&ScheduledNotification::new(
                "r1".to_string(),
                content.clone(),
                trigger,
            ))
            .unwrap();
        }
        db.insert_scheduled_notification(&ScheduledNotification::new(
            "r2".to_string(),
            content,
            Trigger::Daily { hour: 6, minute: 0 },
        ))
        .unwrap();

        let all = db.get_all_scheduled_notifications().unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].trigger, Trigger::weekly_for_day(1, 9, 0).unwrap());

        assert_eq!(db.delete_scheduled_notifications("r1").unwrap(), 3);
        let remaining = db.get_all_scheduled_notifications().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].identifier, "r2");

        assert_eq!(db.delete_all_scheduled_notifications().unwrap(), 1);
    }

    #[tokio::test]
    async fn key_value_trait_goes_through_blocking_pool() {
        let db = Database::open_in_memory().unwrap();
        db.set("archived_messages", "[]").await.unwrap();
        assert_eq!(
            db.get("archived_messages").await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
