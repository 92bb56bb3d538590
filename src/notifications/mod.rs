//! Notification scheduling: the scheduler contract, the bundled schedulers,
//! permission handling and the delivery loop.

pub mod delivery;
pub mod handler;
pub mod local;
pub mod memory;
pub mod scheduler;

pub use delivery::{DeliveryTracker, run_delivery_loop};
pub use handler::{
    DAILY_NOTIFICATION_ID, NotificationBehavior, cancel_daily_notification, ensure_permission,
    handler_behavior, install_handler, schedule_daily_notification,
};
pub use memory::MemoryScheduler;
pub use scheduler::{
    NotificationContent, NotificationScheduler, PermissionStatus, ScheduledNotification,
    SchedulerError, Trigger,
};
