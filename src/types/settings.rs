use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::book::BookCategory;

/// Top-level planner settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlannerSettings {
    pub general: GeneralSettings,
    pub schedule: ScheduleSettings,
    pub rates: ReadingRates,
    pub calendar: CalendarSettings,
    pub content: ContentSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub language: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
        }
    }
}

/// Where and how long sessions are placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSettings {
    pub study_start: NaiveTime,
    pub review_start: NaiveTime,
    /// Daily cap on reading time; no session ever exceeds it.
    pub max_session_minutes: u32,
    pub review_minutes: u32,
    /// Review offsets, counted in selected-weekday occurrences after the
    /// last study session of a book.
    pub review_offsets: Vec<u32>,
    pub default_weekdays: Vec<Weekday>,
    #[serde(default = "default_true")]
    pub final_review: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            study_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            review_start: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or(NaiveTime::MIN),
            max_session_minutes: 120,
            review_minutes: 60,
            review_offsets: vec![1, 3, 7],
            default_weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            final_review: true,
        }
    }
}

/// Seconds needed per page for each category at reading speed 1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingRates {
    pub popularization_seconds_per_page: f64,
    pub theory_seconds_per_page: f64,
    pub analysis_seconds_per_page: f64,
    pub words_per_page: u32,
    pub default_reading_speed: f64,
}

impl ReadingRates {
    pub fn minutes_per_page(&self, category: BookCategory) -> f64 {
        let seconds = match category {
            BookCategory::Popularization => self.popularization_seconds_per_page,
            BookCategory::Theory => self.theory_seconds_per_page,
            BookCategory::Analysis => self.analysis_seconds_per_page,
        };
        seconds / 60.0
    }
}

impl Default for ReadingRates {
    fn default() -> Self {
        Self {
            popularization_seconds_per_page: 120.0,
            theory_seconds_per_page: 145.0,
            analysis_seconds_per_page: 180.0,
            words_per_page: 250,
            default_reading_speed: 1.0,
        }
    }
}

/// Metadata written into exported calendars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarSettings {
    pub calendar_name: String,
    pub timezone: String,
    pub organizer_name: Option<String>,
    pub organizer_email: Option<String>,
    pub study_location: String,
    pub review_location: String,
    pub uid_domain: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_name: "Plan de Lectura".to_string(),
            timezone: "Europe/Madrid".to_string(),
            organizer_name: None,
            organizer_email: None,
            study_location: "Sala de estudio".to_string(),
            review_location: "Espacio de estudio tranquilo".to_string(),
            uid_domain: "planlector.local".to_string(),
        }
    }
}

/// Document store and cache configuration for the content viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentSettings {
    /// SQLite file holding the documents. `None` uses the platform data dir.
    pub database_path: Option<String>,
    pub cache_ttl_seconds: u64,
    pub max_cache_entries: u64,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            cache_ttl_seconds: 600,
            max_cache_entries: 64,
        }
    }
}
