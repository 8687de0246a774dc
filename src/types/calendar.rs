use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reminder attached to a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventAlarm {
    pub minutes_before: u32,
    pub description: String,
}

/// Exported representation of a reading session, one per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub dtstamp: DateTime<Utc>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub priority: u8,
    pub alarms: Vec<EventAlarm>,
}

impl CalendarEvent {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}
