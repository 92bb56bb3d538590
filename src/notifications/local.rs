//! Local scheduler persisted in the application database.
//!
//! Triggers are rows in `scheduled_notifications` and fire through the
//! delivery loop while `blessing watch` runs.

use async_trait::async_trait;
use tracing::debug;

use super::scheduler::{
    NotificationContent, NotificationScheduler, PermissionStatus, ScheduledNotification,
    SchedulerError, Trigger,
};
use crate::database::Database;

const PERMISSION_KEY: &str = "notification_permission";

#[async_trait]
impl NotificationScheduler for Database {
    async fn schedule(
        &self,
        identifier: &str,
        content: &NotificationContent,
        trigger: Trigger,
    ) -> Result<(), SchedulerError> {
        trigger.validate()?;
        let notification =
            ScheduledNotification::new(identifier.to_string(), content.clone(), trigger);
        let id = self
            .blocking(move |db| db.insert_scheduled_notification(&notification))
            .await?;
        debug!(identifier, id, ?trigger, "trigger scheduled");
        Ok(())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError> {
        let owned = identifier.to_string();
        let removed = self
            .blocking(move |db| db.delete_scheduled_notifications(&owned))
            .await?;
        debug!(identifier, removed, "triggers cancelled");
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), SchedulerError> {
        let removed = self
            .blocking(|db| db.delete_all_scheduled_notifications())
            .await?;
        debug!(removed, "all triggers cancelled");
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<ScheduledNotification>, SchedulerError> {
        Ok(self
            .blocking(|db| db.get_all_scheduled_notifications())
            .await?)
    }

    async fn permission_status(&self) -> Result<PermissionStatus, SchedulerError> {
        let stored = self.blocking(|db| db.get_value(PERMISSION_KEY)).await?;
        Ok(match stored.as_deref() {
            Some("granted") => PermissionStatus::Granted,
            Some("denied") => PermissionStatus::Denied,
            _ => PermissionStatus::Undetermined,
        })
    }

    /// Running the local scheduler is consent, so the prompt always grants
    async fn request_permission(&self) -> Result<PermissionStatus, SchedulerError> {
        self.blocking(|db| db.set_value(PERMISSION_KEY, "granted"))
            .await?;
        Ok(PermissionStatus::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_scheduler_persists_and_cancels_triggers() {
        let db = Database::open_in_memory().unwrap();
        let content = NotificationContent::new("Daily Blessing Reminder", "Time to reflect");
        for day in [1, 3, 5] {
            let trigger = Trigger::weekly_for_day(day, 9, 0).unwrap();
            db.schedule("r1", &content, trigger).await.unwrap();
        }

        let pending = db.pending().await.unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|n| n.identifier == "r1" && n.content == content));

        db.cancel("r1").await.unwrap();
        assert!(db.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_trigger_is_rejected_before_insert() {
        let db = Database::open_in_memory().unwrap();
        let content = NotificationContent::new("t", "b");
        let bad = Trigger::Weekly {
            weekday: 8,
            hour: 9,
            minute: 0,
        };
        assert!(matches!(
            db.schedule("r", &content, bad).await,
            Err(SchedulerError::InvalidTrigger(_))
        ));
        assert!(db.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn permission_is_remembered() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(
            db.permission_status().await.unwrap(),
            PermissionStatus::Undetermined
        );
        assert_eq!(
            db.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );
        assert_eq!(
            db.permission_status().await.unwrap(),
            PermissionStatus::Granted
        );
    }
}
