//! Reminder list plus the scheduled triggers that follow each reminder's
//! `enabled` flag.
//!
//! The list is always written before the scheduler is touched. If the process
//! dies between the two, the stored flag and the live triggers disagree until
//! the next toggle or an explicit `reschedule_all`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::Reminder;
use crate::notifications::{NotificationContent, NotificationScheduler, Trigger};
use crate::storage::{self, KeyValueStore};

pub const REMINDERS_KEY: &str = "daily_reminders";

const LOAD_FAILED: &str = "Failed to load reminders";
const ADD_FAILED: &str = "Failed to add reminder";
const UPDATE_FAILED: &str = "Failed to update reminder";
const DELETE_FAILED: &str = "Failed to delete reminder";

pub struct ReminderStore {
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    content: NotificationContent,
    notifications_supported: bool,
    reminders: Vec<Reminder>,
    loading: bool,
    error: Option<String>,
}

impl ReminderStore {
    pub fn new(store: Arc<dyn KeyValueStore>, scheduler: Arc<dyn NotificationScheduler>) -> Self {
        Self {
            store,
            scheduler,
            content: NotificationContent::new(
                "Daily Blessing Reminder",
                "Time to reflect on your daily blessing",
            ),
            notifications_supported: true,
            reminders: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Title and body used for every reminder trigger
    pub fn with_content(mut self, content: NotificationContent) -> Self {
        self.content = content;
        self
    }

    /// Without local notification support every schedule/cancel call is skipped
    pub fn with_notifications(mut self, supported: bool) -> Self {
        self.notifications_supported = supported;
        self
    }

    /// Load once. A load failure is kept in `error()` and leaves the list empty.
    pub async fn open(mut self) -> Self {
        let _ = self.load().await;
        self
    }

    pub async fn load(&mut self) -> Result<(), StoreError> {
        let result = storage::read_list::<Reminder>(self.store.as_ref(), REMINDERS_KEY).await;
        self.loading = false;
        match result {
            Ok(reminders) => {
                debug!(count = reminders.len(), "reminders loaded");
                self.reminders = reminders;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "reminder load failed");
                self.reminders.clear();
                Err(self.fail(StoreError::load(LOAD_FAILED, e)))
            }
        }
    }

    /// Append, persist, then schedule one trigger per day if enabled
    pub async fn add(&mut self, reminder: Reminder) -> Result<(), StoreError> {
        let mut staged = self.reminders.clone();
        staged.push(reminder.clone());
        self.commit(staged, ADD_FAILED).await?;

        if reminder.enabled {
            self.schedule_reminder(&reminder).await;
        }
        info!(id = %reminder.id, enabled = reminder.enabled, "reminder added");
        Ok(())
    }

    /// Flip `enabled`; unknown ids are a no-op
    pub async fn toggle(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(index) = self.reminders.iter().position(|r| r.id == id) else {
            debug!(id, "toggle for unknown reminder ignored");
            return Ok(());
        };

        let mut staged = self.reminders.clone();
        staged[index].enabled = !staged[index].enabled;
        let updated = staged[index].clone();
        self.commit(staged, UPDATE_FAILED).await?;

        if updated.enabled {
            self.schedule_reminder(&updated).await;
        } else {
            self.cancel_reminder(id).await;
        }
        info!(id, enabled = updated.enabled, "reminder toggled");
        Ok(())
    }

    /// Remove from the list, persist, then cancel its triggers
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let staged = self
            .reminders
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.commit(staged, DELETE_FAILED).await?;
        self.cancel_reminder(id).await;
        info!(id, "reminder deleted");
        Ok(())
    }

    /// Cancel every trigger and schedule each enabled reminder again
    pub async fn reschedule_all(&self) {
        if !self.notifications_supported {
            return;
        }
        if let Err(e) = self.scheduler.cancel_all().await {
            warn!(error = %e, "cancel all before reschedule failed");
        }
        for reminder in self.reminders.iter().filter(|r| r.enabled) {
            self.schedule_reminder(reminder).await;
        }
    }

    /// Failures are logged per day; remaining days are still attempted
    async fn schedule_reminder(&self, reminder: &Reminder) {
        if !self.notifications_supported {
            return;
        }

        let (hour, minute) = (reminder.time.hour(), reminder.time.minute());
        for &day in &reminder.days {
            let result = match Trigger::weekly_for_day(day, hour, minute) {
                Ok(trigger) => {
                    self.scheduler
                        .schedule(&reminder.id, &self.content, trigger)
                        .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!(id = %reminder.id, day, error = %e, "failed to schedule reminder trigger");
            }
        }
    }

    async fn cancel_reminder(&self, id: &str) {
        if !self.notifications_supported {
            return;
        }
        if let Err(e) = self.scheduler.cancel(id).await {
            warn!(id, error = %e, "failed to cancel reminder triggers");
        }
    }

    async fn commit(
        &mut self,
        staged: Vec<Reminder>,
        context: &'static str,
    ) -> Result<(), StoreError> {
        if let Err(e) = storage::write_list(self.store.as_ref(), REMINDERS_KEY, &staged).await {
            warn!(error = %e, context, "reminder write failed");
            return Err(self.fail(StoreError::write(context, e)));
        }
        self.reminders = staged;
        Ok(())
    }

    fn fail(&mut self, error: StoreError) -> StoreError {
        self.error = Some(error.message().to_string());
        error
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
