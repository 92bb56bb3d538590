use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] crate::database::DatabaseError),
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),
    #[error("Scheduling rejected: {0}")]
    Rejected(String),
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
}

/// Title and body shown when a notification fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Recurring trigger rule. Both variants repeat until cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trigger {
    /// `weekday` is 1-7 with 1 = Sunday
    Weekly { weekday: u8, hour: u8, minute: u8 },
    Daily { hour: u8, minute: u8 },
}

impl Trigger {
    /// Weekly trigger for a reminder day index (0 = Sunday)
    pub fn weekly_for_day(day: u8, hour: u8, minute: u8) -> Result<Self, SchedulerError> {
        if day > 6 {
            return Err(SchedulerError::InvalidTrigger(format!(
                "day index {} outside 0-6",
                day
            )));
        }
        let trigger = Trigger::Weekly {
            weekday: day + 1,
            hour,
            minute,
        };
        trigger.validate()?;
        Ok(trigger)
    }

    pub fn validate(&self) -> Result<(), SchedulerError> {
        let (hour, minute) = self.time();
        if hour > 23 || minute > 59 {
            return Err(SchedulerError::InvalidTrigger(format!(
                "time {}:{} out of range",
                hour, minute
            )));
        }
        if let Trigger::Weekly { weekday, .. } = self {
            if !(1..=7).contains(weekday) {
                return Err(SchedulerError::InvalidTrigger(format!(
                    "weekday {} outside 1-7",
                    weekday
                )));
            }
        }
        Ok(())
    }

    pub fn time(&self) -> (u8, u8) {
        match *self {
            Trigger::Weekly { hour, minute, .. } | Trigger::Daily { hour, minute } => {
                (hour, minute)
            }
        }
    }

    /// Whether this trigger fires during the given local minute
    pub fn matches(&self, at: NaiveDateTime) -> bool {
        let (hour, minute) = self.time();
        if at.hour() != hour as u32 || at.minute() != minute as u32 {
            return false;
        }
        match *self {
            Trigger::Weekly { weekday, .. } => {
                at.weekday().num_days_from_sunday() + 1 == weekday as u32
            }
            Trigger::Daily { .. } => true,
        }
    }
}

/// One registered trigger as held by a scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub id: Option<i64>,
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: Trigger,
    pub created_at: String,
}

impl ScheduledNotification {
    pub fn new(identifier: String, content: NotificationContent, trigger: Trigger) -> Self {
        Self {
            id: None,
            identifier,
            content,
            trigger,
            created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Platform facility that fires notifications at matching wall-clock times.
///
/// Several triggers may be registered under the same identifier; `cancel`
/// removes every trigger carrying it.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(
        &self,
        identifier: &str,
        content: &NotificationContent,
        trigger: Trigger,
    ) -> Result<(), SchedulerError>;

    async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError>;

    async fn cancel_all(&self) -> Result<(), SchedulerError>;

    /// Every outstanding trigger
    async fn pending(&self) -> Result<Vec<ScheduledNotification>, SchedulerError>;

    async fn permission_status(&self) -> Result<PermissionStatus, SchedulerError>;

    async fn request_permission(&self) -> Result<PermissionStatus, SchedulerError>;
}
