use std::sync::Arc;

use blessing::archive::filter_messages;
use blessing::notifications::{MemoryScheduler, NotificationScheduler, Trigger};
use blessing::{ArchiveStore, Database, Message, Reminder, ReminderStore, ReminderTime};
use tempfile::tempdir;

fn message(id: &str, text: &str, category: &str, date: &str) -> Message {
    Message::new(
        id.to_string(),
        text.to_string(),
        category.to_string(),
        date.to_string(),
    )
}

fn open_db(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("blessing.db");
    Database::new(path.to_str().unwrap()).unwrap()
}

#[tokio::test]
async fn archive_scenario_on_sqlite() {
    let dir = tempdir().unwrap();
    let db = Arc::new(open_db(&dir));
    let mut archive = ArchiveStore::open(db.clone()).await;
    assert!(archive.messages().is_empty());
    assert!(archive.error().is_none());

    archive
        .archive(message("A", "Hello", "Faith", "2024-01-01"))
        .await
        .unwrap();
    assert_eq!(archive.messages()[0].is_favorite, None);

    archive.toggle_favorite("A").await.unwrap();
    assert_eq!(archive.messages()[0].is_favorite, Some(true));

    archive
        .archive(message("B", "World", "Health", "2024-01-02"))
        .await
        .unwrap();
    let ids: Vec<&str> = archive.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A"]);

    // A fresh handle on the same file reads the same list back
    let reopened = ArchiveStore::open(Arc::new(open_db(&dir))).await;
    assert_eq!(reopened.messages(), archive.messages());

    let all: Vec<&Message> = filter_messages(reopened.messages(), "", None).collect();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, "B");
}

#[tokio::test]
async fn reminder_lifecycle_with_memory_scheduler() {
    let dir = tempdir().unwrap();
    let db = Arc::new(open_db(&dir));
    let scheduler = Arc::new(MemoryScheduler::new());
    let mut reminders = ReminderStore::new(db.clone(), scheduler.clone())
        .open()
        .await;

    let reminder = Reminder::new(
        "r1".to_string(),
        "A".to_string(),
        ReminderTime::new(9, 0).unwrap(),
        vec![1, 3, 5],
    );
    reminders.add(reminder).await.unwrap();
    let registered = scheduler.triggers_for("r1");
    assert_eq!(registered.len(), 3);

    reminders.toggle("r1").await.unwrap();
    assert!(scheduler.triggers_for("r1").is_empty());
    let stored = ReminderStore::new(db.clone(), scheduler.clone())
        .open()
        .await;
    assert!(!stored.get("r1").unwrap().enabled);

    reminders.toggle("r1").await.unwrap();
    assert_eq!(scheduler.triggers_for("r1"), registered);

    reminders.delete("r1").await.unwrap();
    assert!(scheduler.triggers_for("r1").is_empty());
    let stored = ReminderStore::new(db, scheduler).open().await;
    assert!(stored.get("r1").is_none());
}

#[tokio::test]
async fn sqlite_as_both_store_and_scheduler() {
    let dir = tempdir().unwrap();
    let db = Arc::new(open_db(&dir));
    let mut reminders = ReminderStore::new(db.clone(), db.clone()).open().await;

    let reminder = Reminder::new(
        "r1".to_string(),
        String::new(),
        ReminderTime::new(18, 30).unwrap(),
        vec![0, 6],
    );
    reminders.add(reminder).await.unwrap();

    let pending = db.pending().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().any(|n| n.trigger
        == Trigger::Weekly {
            weekday: 7,
            hour: 18,
            minute: 30
        }));

    reminders.toggle("r1").await.unwrap();
    assert!(db.pending().await.unwrap().is_empty());
}
