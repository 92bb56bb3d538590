use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    pub fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "daily-blessing-dev",
            Profile::Prod => "daily-blessing",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "daily-blessing-dev" instead of "daily-blessing"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "daily-blessing", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "daily-blessing", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Millisecond timestamp used as a fresh reminder id
pub fn new_reminder_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_path_leaves_absolute_paths() {
        assert_eq!(expand_path("/tmp/app.db"), PathBuf::from("/tmp/app.db"));
    }

    #[test]
    fn expand_path_resolves_home() {
        let expanded = expand_path("~/blessing/app.db");
        assert!(expanded.ends_with("blessing/app.db"));
        if BaseDirs::new().is_some() {
            assert!(!expanded.starts_with("~"));
        }
    }

    #[test]
    fn profiles_use_separate_names() {
        assert_ne!(Profile::Dev.app_name(), Profile::Prod.app_name());
    }

    #[test]
    fn reminder_ids_are_numeric() {
        assert!(new_reminder_id().parse::<i64>().is_ok());
    }
}
