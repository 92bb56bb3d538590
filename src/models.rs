use std::fmt;
use std::str::FromStr;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Short weekday labels indexed by day number (0 = Sunday)
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// An archived blessing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub category: String,
    pub date: String,
    #[serde(rename = "isFavorite", default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl Message {
    pub fn new(id: String, text: String, category: String, date: String) -> Self {
        Self {
            id,
            text,
            category,
            date,
            is_favorite: None,
        }
    }

    /// Absent is treated as not favorite
    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }

    /// Case-insensitive match against text or category
    pub fn matches_search(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.text.to_lowercase().contains(&query_lower)
            || self.category.to_lowercase().contains(&query_lower)
    }
}

/// Wall-clock time of day in 24-hour form, stored as "HH:mm"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid time '{0}', expected HH:MM")]
pub struct InvalidTime(pub String);

impl ReminderTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, InvalidTime> {
        if hour > 23 || minute > 59 {
            return Err(InvalidTime(format!("{}:{}", hour, minute)));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for ReminderTime {
    type Err = InvalidTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = chrono::NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|_| InvalidTime(s.to_string()))?;
        // chrono bounds these to 0..24 and 0..60
        Ok(Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        })
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = InvalidTime;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(time: ReminderTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A recurring reminder tied to an archived message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub time: ReminderTime,
    pub days: Vec<u8>, // 0-6 (Sunday-Saturday)
    pub enabled: bool,
}

impl Reminder {
    pub fn new(id: String, message_id: String, time: ReminderTime, days: Vec<u8>) -> Self {
        Self {
            id,
            message_id,
            time,
            days,
            enabled: true,
        }
    }

    /// Comma-separated day labels, e.g. "Mon, Wed, Fri"
    pub fn day_labels(&self) -> String {
        self.days
            .iter()
            .map(|d| day_name(*d).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Label for a day index, None if out of range
pub fn day_name(day: u8) -> Option<&'static str> {
    DAY_NAMES.get(day as usize).copied()
}

/// Parse a comma-separated list of day indices or labels ("1,3,5" or "mon,wed")
pub fn parse_days(input: &str) -> Result<Vec<u8>, String> {
    let mut days = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = match part.parse::<u8>() {
            Ok(n) if n <= 6 => n,
            Ok(n) => return Err(format!("Day index out of range: {}", n)),
            Err(_) => DAY_NAMES
                .iter()
                .position(|name| name.eq_ignore_ascii_case(part))
                .map(|p| p as u8)
                .ok_or_else(|| format!("Unknown day: {}", part))?,
        };
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorite_absent_is_omitted_from_json() {
        let message = Message::new(
            "A".to_string(),
            "Hello".to_string(),
            "Faith".to_string(),
            "2024-01-01".to_string(),
        );
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("isFavorite"));

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.is_favorite, None);
        assert!(!back.is_favorite());
    }

    #[test]
    fn reminder_serializes_camel_case_message_id() {
        let reminder = Reminder::new(
            "r1".to_string(),
            "m1".to_string(),
            ReminderTime::new(9, 5).unwrap(),
            vec![1, 3, 5],
        );
        let value = serde_json::to_value(&reminder).unwrap();
        assert_eq!(value["messageId"], "m1");
        assert_eq!(value["time"], "09:05");
        assert_eq!(value["days"], serde_json::json!([1, 3, 5]));
        assert_eq!(value["enabled"], true);
    }

    #[test]
    fn malformed_time_is_rejected_on_deserialize() {
        let json = r#"{"id":"r","messageId":"m","time":"25:99","days":[1],"enabled":true}"#;
        assert!(serde_json::from_str::<Reminder>(json).is_err());
    }

    #[test]
    fn reminder_time_parses_and_displays() {
        let time: ReminderTime = "7:30".parse().unwrap();
        assert_eq!(time.hour(), 7);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.to_string(), "07:30");
        assert!("noon".parse::<ReminderTime>().is_err());
        assert!(ReminderTime::new(24, 0).is_err());
    }

    #[test]
    fn search_is_case_insensitive_over_text_and_category() {
        let message = Message::new(
            "A".to_string(),
            "Trust in His timing".to_string(),
            "Faith".to_string(),
            "2024-01-01".to_string(),
        );
        assert!(message.matches_search("TIMING"));
        assert!(message.matches_search("fai"));
        assert!(message.matches_search(""));
        assert!(!message.matches_search("health"));
    }

    #[test]
    fn parse_days_accepts_indices_and_names() {
        assert_eq!(parse_days("1,3,5").unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_days("sun, Sat").unwrap(), vec![0, 6]);
        assert_eq!(parse_days("1,1,2").unwrap(), vec![1, 2]);
        assert!(parse_days("7").is_err());
        assert!(parse_days("someday").is_err());
    }

    #[test]
    fn day_labels_render_in_order() {
        let reminder = Reminder::new(
            "r".to_string(),
            String::new(),
            ReminderTime::new(9, 0).unwrap(),
            vec![1, 2, 9],
        );
        assert_eq!(reminder.day_labels(), "Mon, Tue, ?");
    }
}
