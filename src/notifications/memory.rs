use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::scheduler::{
    NotificationContent, NotificationScheduler, PermissionStatus, ScheduledNotification,
    SchedulerError, Trigger,
};

/// In-process scheduler that records triggers instead of firing them
#[derive(Debug)]
pub struct MemoryScheduler {
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    scheduled: Vec<ScheduledNotification>,
    next_id: i64,
    permission: PermissionStatus,
    grant_on_request: bool,
    failing_weekdays: HashSet<u8>,
}

impl Default for MemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScheduler {
    /// Scheduler whose permission prompt is answered with "granted"
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                scheduled: Vec::new(),
                next_id: 1,
                permission: PermissionStatus::Undetermined,
                grant_on_request: true,
                failing_weekdays: HashSet::new(),
            }),
        }
    }

    /// Scheduler whose permission prompt is refused
    pub fn denying() -> Self {
        let scheduler = Self::new();
        if let Ok(mut state) = scheduler.state.lock() {
            state.grant_on_request = false;
        }
        scheduler
    }

    /// Reject every Weekly trigger for this weekday (1-7)
    pub fn fail_weekday(&self, weekday: u8) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_weekdays.insert(weekday);
        }
    }

    /// Active triggers registered under an identifier
    pub fn triggers_for(&self, identifier: &str) -> Vec<Trigger> {
        self.state
            .lock()
            .map(|state| {
                state
                    .scheduled
                    .iter()
                    .filter(|n| n.identifier == identifier)
                    .map(|n| n.trigger)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, SchedulerError> {
        self.state
            .lock()
            .map_err(|_| SchedulerError::Unavailable("scheduler lock poisoned".to_string()))
    }
}

#[async_trait]
impl NotificationScheduler for MemoryScheduler {
    async fn schedule(
        &self,
        identifier: &str,
        content: &NotificationContent,
        trigger: Trigger,
    ) -> Result<(), SchedulerError> {
        trigger.validate()?;
        let mut state = self.lock()?;
        if let Trigger::Weekly { weekday, .. } = trigger {
            if state.failing_weekdays.contains(&weekday) {
                return Err(SchedulerError::Rejected(format!(
                    "weekday {} unavailable",
                    weekday
                )));
            }
        }
        let mut notification =
            ScheduledNotification::new(identifier.to_string(), content.clone(), trigger);
        notification.id = Some(state.next_id);
        state.next_id += 1;
        state.scheduled.push(notification);
        Ok(())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError> {
        self.lock()?.scheduled.retain(|n| n.identifier != identifier);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), SchedulerError> {
        self.lock()?.scheduled.clear();
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<ScheduledNotification>, SchedulerError> {
        Ok(self.lock()?.scheduled.clone())
    }

    async fn permission_status(&self) -> Result<PermissionStatus, SchedulerError> {
        Ok(self.lock()?.permission)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, SchedulerError> {
        let mut state = self.lock()?;
        state.permission = if state.grant_on_request {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        Ok(state.permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_removes_every_trigger_for_identifier() {
        let scheduler = MemoryScheduler::new();
        let content = NotificationContent::new("t", "b");
        for day in [1, 3, 5] {
            let trigger = Trigger::weekly_for_day(day, 9, 0).unwrap();
            scheduler.schedule("r1", &content, trigger).await.unwrap();
        }
        scheduler
            .schedule("r2", &content, Trigger::Daily { hour: 6, minute: 0 })
            .await
            .unwrap();

        assert_eq!(scheduler.triggers_for("r1").len(), 3);
        scheduler.cancel("r1").await.unwrap();
        assert!(scheduler.triggers_for("r1").is_empty());
        assert_eq!(scheduler.pending().await.unwrap().len(), 1);

        scheduler.cancel_all().await.unwrap();
        assert!(scheduler.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_weekday_rejects_only_that_day() {
        let scheduler = MemoryScheduler::new();
        scheduler.fail_weekday(4);
        let content = NotificationContent::new("t", "b");
        let ok = Trigger::weekly_for_day(1, 9, 0).unwrap();
        let bad = Trigger::weekly_for_day(3, 9, 0).unwrap();
        assert!(scheduler.schedule("r", &content, ok).await.is_ok());
        assert!(scheduler.schedule("r", &content, bad).await.is_err());
        assert_eq!(scheduler.triggers_for("r"), vec![ok]);
    }

    #[tokio::test]
    async fn permission_prompt_answer_is_configurable() {
        let granting = MemoryScheduler::new();
        assert_eq!(
            granting.permission_status().await.unwrap(),
            PermissionStatus::Undetermined
        );
        assert_eq!(
            granting.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );

        let denying = MemoryScheduler::denying();
        assert_eq!(
            denying.request_permission().await.unwrap(),
            PermissionStatus::Denied
        );
        assert_eq!(
            denying.permission_status().await.unwrap(),
            PermissionStatus::Denied
        );
    }
}
