use std::sync::OnceLock;

use tracing::{info, warn};

use super::scheduler::{
    NotificationContent, NotificationScheduler, PermissionStatus, SchedulerError, Trigger,
};

/// Identifier of the single daily notification
pub const DAILY_NOTIFICATION_ID: &str = "daily-blessing";

/// How a notification is presented when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationBehavior {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for NotificationBehavior {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: false,
        }
    }
}

static HANDLER: OnceLock<NotificationBehavior> = OnceLock::new();

/// Register the process-wide presentation behaviour.
///
/// Only the first call takes effect; later calls return `false` and change nothing.
pub fn install_handler(behavior: NotificationBehavior) -> bool {
    let mut installed = false;
    HANDLER.get_or_init(|| {
        installed = true;
        behavior
    });
    installed
}

/// The installed behaviour, or the default if none was registered
pub fn handler_behavior() -> NotificationBehavior {
    HANDLER.get().copied().unwrap_or_default()
}

/// Check permission, prompting once if it has not been granted.
///
/// A denial is not an error: notifications simply never fire.
pub async fn ensure_permission(scheduler: &dyn NotificationScheduler) -> bool {
    let status = match scheduler.permission_status().await {
        Ok(PermissionStatus::Granted) => return true,
        Ok(status) => status,
        Err(e) => {
            warn!(error = %e, "could not read notification permission");
            PermissionStatus::Undetermined
        }
    };

    let final_status = match scheduler.request_permission().await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, previous = ?status, "notification permission request failed");
            return false;
        }
    };

    if final_status != PermissionStatus::Granted {
        info!("notification permission not granted, reminders will not fire");
        return false;
    }
    true
}

/// Replace the daily notification with one firing at `hour:minute`
pub async fn schedule_daily_notification(
    scheduler: &dyn NotificationScheduler,
    hour: u8,
    minute: u8,
    content: &NotificationContent,
) -> Result<(), SchedulerError> {
    let trigger = Trigger::Daily { hour, minute };
    trigger.validate()?;
    scheduler.cancel(DAILY_NOTIFICATION_ID).await?;
    scheduler
        .schedule(DAILY_NOTIFICATION_ID, content, trigger)
        .await?;
    info!(hour, minute, "daily notification scheduled");
    Ok(())
}

/// Remove the daily notification, leaving reminders in place
pub async fn cancel_daily_notification(
    scheduler: &dyn NotificationScheduler,
) -> Result<(), SchedulerError> {
    scheduler.cancel(DAILY_NOTIFICATION_ID).await
}
