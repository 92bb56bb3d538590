use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::{ReminderTime, parse_days};
use crate::notifications::{NotificationBehavior, NotificationContent};
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub reminders: ReminderDefaults,
    #[serde(default)]
    pub share: ShareSettings,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Platform supports local notifications; when false nothing is scheduled
    #[serde(default = "default_true")]
    pub supported: bool,
    #[serde(default = "default_true")]
    pub daily_enabled: bool,
    #[serde(default = "default_daily_time")]
    pub daily_time: String,
    #[serde(default = "default_daily_title")]
    pub daily_title: String,
    #[serde(default = "default_daily_body")]
    pub daily_body: String,
    #[serde(default = "default_reminder_title")]
    pub reminder_title: String,
    #[serde(default = "default_reminder_body")]
    pub reminder_body: String,
    #[serde(default = "default_true")]
    pub show_alert: bool,
    #[serde(default = "default_true")]
    pub play_sound: bool,
    #[serde(default)]
    pub set_badge: bool,
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderDefaults {
    #[serde(default = "default_reminder_time")]
    pub time: String,
    #[serde(default = "default_reminder_days")]
    pub days: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareSettings {
    #[serde(default = "default_signature")]
    pub signature: String,
    #[serde(default = "default_share_title")]
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            notifications: NotificationSettings::default(),
            reminders: ReminderDefaults::default(),
            share: ShareSettings::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            supported: true,
            daily_enabled: true,
            daily_time: default_daily_time(),
            daily_title: default_daily_title(),
            daily_body: default_daily_body(),
            reminder_title: default_reminder_title(),
            reminder_body: default_reminder_body(),
            show_alert: true,
            play_sound: true,
            set_badge: false,
            poll_seconds: default_poll_seconds(),
        }
    }
}

impl Default for ReminderDefaults {
    fn default() -> Self {
        Self {
            time: default_reminder_time(),
            days: default_reminder_days(),
        }
    }
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            signature: default_signature(),
            title: default_share_title(),
        }
    }
}

impl NotificationSettings {
    pub fn daily_content(&self) -> NotificationContent {
        NotificationContent::new(&self.daily_title, &self.daily_body)
    }

    pub fn reminder_content(&self) -> NotificationContent {
        NotificationContent::new(&self.reminder_title, &self.reminder_body)
    }

    pub fn behavior(&self) -> NotificationBehavior {
        NotificationBehavior {
            show_alert: self.show_alert,
            play_sound: self.play_sound,
            set_badge: self.set_badge,
        }
    }

    pub fn daily_time(&self) -> Result<ReminderTime, ConfigError> {
        self.daily_time
            .parse()
            .map_err(|e: crate::models::InvalidTime| ConfigError::InvalidValue(e.to_string()))
    }

    /// Delivery poll period, kept within 1..=60 seconds so no minute is skipped
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_seconds.clamp(1, 60))
    }
}

impl ReminderDefaults {
    pub fn time(&self) -> Result<ReminderTime, ConfigError> {
        self.time
            .parse()
            .map_err(|e: crate::models::InvalidTime| ConfigError::InvalidValue(e.to_string()))
    }

    pub fn days(&self) -> Result<Vec<u8>, ConfigError> {
        parse_days(&self.days).map_err(ConfigError::InvalidValue)
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_daily_time() -> String {
    "06:00".to_string()
}

fn default_daily_title() -> String {
    "Your Daily Blessing".to_string()
}

fn default_daily_body() -> String {
    "Start your day with an inspiring message 🙏".to_string()
}

fn default_reminder_title() -> String {
    "Daily Blessing Reminder".to_string()
}

fn default_reminder_body() -> String {
    "Time to reflect on your daily blessing".to_string()
}

fn default_poll_seconds() -> u64 {
    20
}

fn default_reminder_time() -> String {
    "09:00".to_string()
}

fn default_reminder_days() -> String {
    // Monday to Friday
    "1,2,3,4,5".to_string()
}

fn default_signature() -> String {
    "Daily Blessing KE".to_string()
}

fn default_share_title() -> String {
    "Share Daily Blessing".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine config and database paths
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path, profile)
    }

    /// Load configuration from an explicit file, creating it with defaults if missing
    pub fn load_from_path(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            config.save_to_path(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("blessing.db").to_string_lossy().to_string()
        } else {
            format!("~/.local/share/{}/blessing.db", profile.app_name())
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }
}
