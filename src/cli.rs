use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use crate::archive::ArchiveStore;
use crate::config::{Config, ConfigError};
use crate::daily::todays_message;
use crate::error::StoreError;
use crate::models::{Message, Reminder, ReminderTime, parse_days};
use crate::notifications::{
    self, NotificationScheduler, SchedulerError, cancel_daily_notification, ensure_permission,
    schedule_daily_notification,
};
use crate::reminders::ReminderStore;
use crate::share::{ShareOutcome, share_text, share_to_clipboard};
use crate::storage::KeyValueStore;
use crate::utils::new_reminder_id;

#[derive(Parser)]
#[command(name = "blessing")]
#[command(about = "Daily Blessing - an inspiring message every day, with reminders")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show today's blessing (default if no subcommand)
    Today,
    /// Archive today's blessing
    Archive,
    /// List archived blessings, newest first
    List {
        /// Case-insensitive text or category search
        #[arg(long, short)]
        query: Option<String>,
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
    /// List the categories present in the archive
    Categories,
    /// Toggle the favorite mark on an archived blessing
    Favorite {
        /// Archived message ID
        id: String,
    },
    /// Copy a blessing to the clipboard for sharing (today's if no ID)
    Share {
        /// Archived message ID
        id: Option<String>,
    },
    /// Manage recurring reminders
    #[command(subcommand)]
    Reminder(ReminderCommands),
    /// Schedule or cancel the daily notification
    Daily {
        /// Time of day (HH:MM), defaults to the configured time
        #[arg(long)]
        time: Option<String>,
        /// Cancel the daily notification
        #[arg(long)]
        off: bool,
    },
    /// Run in the foreground and deliver notifications as they fall due
    Watch,
}

#[derive(Subcommand)]
pub enum ReminderCommands {
    /// Add a reminder
    Add {
        /// Time of day (HH:MM)
        #[arg(long)]
        time: Option<String>,
        /// Comma-separated days, 0-6 or names (0 = Sunday)
        #[arg(long)]
        days: Option<String>,
        /// Archived message ID (defaults to the newest)
        #[arg(long)]
        message: Option<String>,
        /// Create the reminder switched off
        #[arg(long)]
        disabled: bool,
    },
    /// List reminders
    List,
    /// Switch a reminder on or off
    Toggle {
        /// Reminder ID
        id: String,
    },
    /// Delete a reminder
    Delete {
        /// Reminder ID
        id: String,
    },
    /// Cancel all scheduled triggers and schedule enabled reminders again
    Resync,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    StoreError(#[from] StoreError),
    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] SchedulerError),
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    LoadFailed(String),
}

/// Shared handles for command handlers
pub struct Context {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub scheduler: Arc<dyn NotificationScheduler>,
}

impl Context {
    pub async fn archive(&self) -> ArchiveStore {
        ArchiveStore::open(self.store.clone()).await
    }

    pub async fn reminders(&self) -> ReminderStore {
        ReminderStore::new(self.store.clone(), self.scheduler.clone())
            .with_content(self.config.notifications.reminder_content())
            .with_notifications(self.config.notifications.supported)
            .open()
            .await
    }

    /// Ask for notification permission when this command schedules anything
    async fn prepare_notifications(&self) -> bool {
        self.config.notifications.supported && ensure_permission(self.scheduler.as_ref()).await
    }
}

/// Dispatch a parsed command
pub async fn run(command: Commands, ctx: &Context) -> Result<(), CliError> {
    match command {
        Commands::Today => handle_today(ctx),
        Commands::Archive => handle_archive(ctx).await,
        Commands::List { query, category } => {
            handle_list(ctx, query.as_deref().unwrap_or(""), category.as_deref()).await
        }
        Commands::Categories => handle_categories(ctx).await,
        Commands::Favorite { id } => handle_favorite(ctx, &id).await,
        Commands::Share { id } => handle_share(ctx, id.as_deref()).await,
        Commands::Reminder(cmd) => match cmd {
            ReminderCommands::Add {
                time,
                days,
                message,
                disabled,
            } => handle_add_reminder(ctx, time, days, message, disabled).await,
            ReminderCommands::List => handle_list_reminders(ctx).await,
            ReminderCommands::Toggle { id } => handle_toggle_reminder(ctx, &id).await,
            ReminderCommands::Delete { id } => handle_delete_reminder(ctx, &id).await,
            ReminderCommands::Resync => handle_resync(ctx).await,
        },
        Commands::Daily { time, off } => handle_daily(ctx, time, off).await,
        Commands::Watch => handle_watch(ctx).await,
    }
}

/// One archive entry as shown in lists
pub fn format_message(message: &Message) -> String {
    let star = if message.is_favorite() { "★" } else { " " };
    format!(
        "{} [{}] {} ({})\n  {}",
        star, message.id, message.category, message.date, message.text
    )
}

/// One reminder as shown in lists
pub fn format_reminder(reminder: &Reminder) -> String {
    let state = if reminder.enabled { "on " } else { "off" };
    format!(
        "[{}] {} {}  {}  message: {}",
        reminder.id,
        state,
        reminder.time,
        reminder.day_labels(),
        if reminder.message_id.is_empty() {
            "-"
        } else {
            reminder.message_id.as_str()
        }
    )
}

fn handle_today(_ctx: &Context) -> Result<(), CliError> {
    let message = todays_message(chrono::Local::now());
    println!("{}  ·  {}\n", message.date, message.category);
    println!("{}", message.text);
    Ok(())
}

async fn handle_archive(ctx: &Context) -> Result<(), CliError> {
    let mut archive = ctx.archive().await;
    if let Some(err) = archive.error() {
        return Err(CliError::LoadFailed(err.to_string()));
    }
    let message = todays_message(chrono::Local::now());
    let id = message.id.clone();
    archive.archive(message).await?;
    println!("Today's blessing has been archived! (ID: {})", id);
    Ok(())
}

async fn handle_list(ctx: &Context, query: &str, category: Option<&str>) -> Result<(), CliError> {
    let archive = ctx.archive().await;
    if let Some(err) = archive.error() {
        println!("{}", err);
        return Ok(());
    }

    let mut shown = 0;
    for message in archive.filtered(query, category) {
        println!("{}", format_message(message));
        shown += 1;
    }
    if shown == 0 {
        println!("No blessings found");
    }
    Ok(())
}

async fn handle_categories(ctx: &Context) -> Result<(), CliError> {
    let archive = ctx.archive().await;
    if let Some(err) = archive.error() {
        println!("{}", err);
        return Ok(());
    }
    for category in archive.categories() {
        println!("{}", category);
    }
    Ok(())
}

async fn handle_favorite(ctx: &Context, id: &str) -> Result<(), CliError> {
    let mut archive = ctx.archive().await;
    if let Some(err) = archive.error() {
        return Err(CliError::LoadFailed(err.to_string()));
    }
    if archive.get(id).is_none() {
        return Err(CliError::NotFound(format!("archived message {}", id)));
    }
    archive.toggle_favorite(id).await?;
    let favorite = archive.get(id).is_some_and(|m| m.is_favorite());
    println!(
        "{} {}",
        id,
        if favorite {
            "marked as favorite"
        } else {
            "removed from favorites"
        }
    );
    Ok(())
}

async fn handle_share(ctx: &Context, id: Option<&str>) -> Result<(), CliError> {
    let text = match id {
        Some(id) => {
            let archive = ctx.archive().await;
            if let Some(err) = archive.error() {
                return Err(CliError::LoadFailed(err.to_string()));
            }
            archive
                .get(id)
                .map(|m| m.text.clone())
                .ok_or_else(|| CliError::NotFound(format!("archived message {}", id)))?
        }
        None => todays_message(chrono::Local::now()).text,
    };

    let text = share_text(&text, &ctx.config.share.signature);
    match share_to_clipboard(&ctx.config.share.title, &text) {
        ShareOutcome::Shared => println!("Copied to clipboard:\n\n{}", text),
        ShareOutcome::Dismissed => println!("{}", text),
    }
    Ok(())
}

async fn handle_add_reminder(
    ctx: &Context,
    time: Option<String>,
    days: Option<String>,
    message: Option<String>,
    disabled: bool,
) -> Result<(), CliError> {
    let time: ReminderTime = match time {
        Some(t) => t
            .parse()
            .map_err(|e: crate::models::InvalidTime| CliError::InvalidArgument(e.to_string()))?,
        None => ctx.config.reminders.time()?,
    };
    let days = match days {
        Some(d) => parse_days(&d).map_err(CliError::InvalidArgument)?,
        None => ctx.config.reminders.days()?,
    };
    if days.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one day is required".to_string(),
        ));
    }

    let message_id = match message {
        Some(id) => id,
        None => ctx
            .archive()
            .await
            .messages()
            .first()
            .map(|m| m.id.clone())
            .unwrap_or_default(),
    };

    // Never write over a list that could not be read
    let mut reminders = ctx.reminders().await;
    if let Some(err) = reminders.error() {
        return Err(CliError::LoadFailed(err.to_string()));
    }

    if !disabled {
        ctx.prepare_notifications().await;
    }

    let mut reminder = Reminder::new(new_reminder_id(), message_id, time, days);
    reminder.enabled = !disabled;

    reminders.add(reminder.clone()).await?;
    println!("Reminder created successfully (ID: {})", reminder.id);
    Ok(())
}

async fn handle_list_reminders(ctx: &Context) -> Result<(), CliError> {
    let reminders = ctx.reminders().await;
    if let Some(err) = reminders.error() {
        println!("{}", err);
        return Ok(());
    }
    if reminders.reminders().is_empty() {
        println!("No reminders set");
        return Ok(());
    }
    for reminder in reminders.reminders() {
        println!("{}", format_reminder(reminder));
    }
    Ok(())
}

async fn handle_toggle_reminder(ctx: &Context, id: &str) -> Result<(), CliError> {
    let mut reminders = ctx.reminders().await;
    if let Some(err) = reminders.error() {
        return Err(CliError::LoadFailed(err.to_string()));
    }
    let Some(current) = reminders.get(id) else {
        return Err(CliError::NotFound(format!("reminder {}", id)));
    };
    if !current.enabled {
        ctx.prepare_notifications().await;
    }
    reminders.toggle(id).await?;
    if let Some(reminder) = reminders.get(id) {
        println!("{}", format_reminder(reminder));
    }
    Ok(())
}

async fn handle_delete_reminder(ctx: &Context, id: &str) -> Result<(), CliError> {
    let mut reminders = ctx.reminders().await;
    if let Some(err) = reminders.error() {
        return Err(CliError::LoadFailed(err.to_string()));
    }
    if reminders.get(id).is_none() {
        return Err(CliError::NotFound(format!("reminder {}", id)));
    }
    reminders.delete(id).await?;
    println!("Reminder {} deleted", id);
    Ok(())
}

async fn handle_resync(ctx: &Context) -> Result<(), CliError> {
    if !ctx.prepare_notifications().await {
        println!("Notifications are not available, nothing to schedule");
        return Ok(());
    }
    let reminders = ctx.reminders().await;
    reminders.reschedule_all().await;

    // cancel_all also removed the daily notification
    let settings = &ctx.config.notifications;
    if settings.daily_enabled {
        let time = settings.daily_time()?;
        schedule_daily_notification(
            ctx.scheduler.as_ref(),
            time.hour(),
            time.minute(),
            &settings.daily_content(),
        )
        .await?;
    }
    let pending = ctx.scheduler.pending().await?;
    println!("{} notification triggers scheduled", pending.len());
    Ok(())
}

async fn handle_daily(ctx: &Context, time: Option<String>, off: bool) -> Result<(), CliError> {
    let settings = &ctx.config.notifications;
    if !settings.supported {
        println!("Notifications are not supported on this platform");
        return Ok(());
    }

    if off {
        cancel_daily_notification(ctx.scheduler.as_ref()).await?;
        println!("Daily notification cancelled");
        return Ok(());
    }

    let time: ReminderTime = match time {
        Some(t) => t
            .parse()
            .map_err(|e: crate::models::InvalidTime| CliError::InvalidArgument(e.to_string()))?,
        None => settings.daily_time()?,
    };
    if !ctx.prepare_notifications().await {
        println!("Notification permission not granted");
        return Ok(());
    }
    schedule_daily_notification(
        ctx.scheduler.as_ref(),
        time.hour(),
        time.minute(),
        &settings.daily_content(),
    )
    .await?;
    println!("Daily notification set for {}", time);
    Ok(())
}

async fn handle_watch(ctx: &Context) -> Result<(), CliError> {
    if !ctx.prepare_notifications().await {
        println!("Notifications are not available");
        return Ok(());
    }
    let poll = ctx.config.notifications.poll_interval();
    info!("watching for due notifications, press Ctrl-C to stop");
    notifications::run_delivery_loop(ctx.scheduler.clone(), poll).await;
    Ok(())
}
