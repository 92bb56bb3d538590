pub mod archive;
pub mod cli;
pub mod config;
pub mod daily;
pub mod database;
pub mod error;
pub mod models;
pub mod notifications;
pub mod reminders;
pub mod share;
pub mod storage;
pub mod utils;

pub use archive::ArchiveStore;
pub use config::Config;
pub use database::Database;
pub use error::StoreError;
pub use models::{Message, Reminder, ReminderTime};
pub use reminders::ReminderStore;
pub use utils::Profile;
