use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use tracing::{info, warn};

use super::handler::{NotificationBehavior, handler_behavior};
use super::scheduler::{NotificationScheduler, ScheduledNotification, Trigger};

/// Remembers what already fired so each trigger fires at most once per minute
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    minute: Option<NaiveDateTime>,
    fired: HashSet<(String, Trigger)>,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers due at `now` that have not fired during this minute yet
    pub fn take_due(
        &mut self,
        pending: &[ScheduledNotification],
        now: NaiveDateTime,
    ) -> Vec<ScheduledNotification> {
        let minute = now.with_second(0).and_then(|t| t.with_nanosecond(0));
        if minute != self.minute {
            self.minute = minute;
            self.fired.clear();
        }

        pending
            .iter()
            .filter(|n| n.trigger.matches(now))
            .filter(|n| self.fired.insert((n.identifier.clone(), n.trigger)))
            .cloned()
            .collect()
    }
}

/// Terminal rendering of a fired notification
pub fn render(notification: &ScheduledNotification, behavior: NotificationBehavior) -> String {
    let mut out = String::new();
    if behavior.show_alert {
        out.push_str(&format!(
            "{}\n{}\n",
            notification.content.title, notification.content.body
        ));
    }
    if behavior.play_sound {
        out.push('\u{7}');
    }
    out
}

/// Poll the scheduler and fire due notifications until Ctrl-C
pub async fn run_delivery_loop(scheduler: Arc<dyn NotificationScheduler>, poll: Duration) {
    let behavior = handler_behavior();
    let mut tracker = DeliveryTracker::new();
    let mut ticker = tokio::time::interval(poll);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(poll_secs = poll.as_secs(), "notification delivery started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let pending = match scheduler.pending().await {
                    Ok(pending) => pending,
                    Err(e) => {
                        warn!(error = %e, "could not read scheduled notifications");
                        continue;
                    }
                };
                let now = chrono::Local::now().naive_local();
                for notification in tracker.take_due(&pending, now) {
                    info!(identifier = %notification.identifier, "notification fired");
                    let rendered = render(&notification, behavior);
                    let mut stdout = std::io::stdout();
                    if let Err(e) = stdout.write_all(rendered.as_bytes()).and_then(|_| stdout.flush()) {
                        warn!(error = %e, "could not print notification");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("notification delivery stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationContent;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        // January 2024: the 7th is a Sunday
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn scheduled(identifier: &str, trigger: Trigger) -> ScheduledNotification {
        ScheduledNotification::new(
            identifier.to_string(),
            NotificationContent::new("Daily Blessing Reminder", "Time to reflect"),
            trigger,
        )
    }

    #[test]
    fn fires_once_per_matching_minute() {
        let pending = vec![
            scheduled("r1", Trigger::weekly_for_day(1, 9, 0).unwrap()),
            scheduled("r1", Trigger::weekly_for_day(2, 9, 0).unwrap()),
            scheduled("daily-blessing", Trigger::Daily { hour: 9, minute: 0 }),
        ];
        let mut tracker = DeliveryTracker::new();

        // Monday 09:00
        let due = tracker.take_due(&pending, at(8, 9, 0, 5));
        assert_eq!(due.len(), 2);
        assert!(tracker.take_due(&pending, at(8, 9, 0, 35)).is_empty());
        assert!(tracker.take_due(&pending, at(8, 9, 1, 5)).is_empty());

        // Tuesday 09:00 fires again
        let due = tracker.take_due(&pending, at(9, 9, 0, 0));
        assert_eq!(due.len(), 2);
        assert!(due.iter().any(|n| n.identifier == "r1"));
    }

    #[test]
    fn render_follows_behavior() {
        let notification = scheduled("r", Trigger::Daily { hour: 6, minute: 0 });
        let silent = NotificationBehavior {
            show_alert: true,
            play_sound: false,
            set_badge: false,
        };
        assert_eq!(
            render(&notification, silent),
            "Daily Blessing Reminder\nTime to reflect\n"
        );
        let loud = NotificationBehavior::default();
        assert!(render(&notification, loud).ends_with('\u{7}'));
    }
}
