use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Reading density of a book. Denser material takes longer per page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookCategory {
    Theory,
    Popularization,
    Analysis,
}

impl BookCategory {
    pub const ALL: [BookCategory; 3] = [
        BookCategory::Popularization,
        BookCategory::Theory,
        BookCategory::Analysis,
    ];

    /// Single-letter code used in compact book specs (`D`, `T`, `A`).
    pub fn code(&self) -> char {
        match self {
            BookCategory::Popularization => 'D',
            BookCategory::Theory => 'T',
            BookCategory::Analysis => 'A',
        }
    }

    /// Locale key for the category's display name.
    pub fn locale_key(&self) -> &'static str {
        match self {
            BookCategory::Popularization => "category.popularization",
            BookCategory::Theory => "category.theory",
            BookCategory::Analysis => "category.analysis",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookCategory::Theory => write!(f, "theory"),
            BookCategory::Popularization => write!(f, "popularization"),
            BookCategory::Analysis => write!(f, "analysis"),
        }
    }
}

impl FromStr for BookCategory {
    type Err = String;

    /// Accepts the English name, the Spanish name, or the single-letter code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t" | "theory" | "teoría" | "teoria" => Ok(BookCategory::Theory),
            "d" | "popularization" | "popular science" | "divulgación" | "divulgacion" => {
                Ok(BookCategory::Popularization)
            }
            "a" | "analysis" | "análisis" | "analisis" => Ok(BookCategory::Analysis),
            other => Err(format!("unknown book category: {}", other)),
        }
    }
}

/// How the size of a book is expressed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookSize {
    Pages(u32),
    Words(u32),
    /// Reader-supplied estimate that bypasses the per-page rates.
    Minutes(u32),
}

impl BookSize {
    pub fn is_zero(&self) -> bool {
        matches!(
            self,
            BookSize::Pages(0) | BookSize::Words(0) | BookSize::Minutes(0)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BookStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// A book in the user's reading list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub category: BookCategory,
    pub size: BookSize,
    #[serde(default)]
    pub status: BookStatus,
}

impl Book {
    /// Builds a book with a fresh ID and `NotStarted` status.
    pub fn new(title: impl Into<String>, category: BookCategory, size: BookSize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            category,
            size,
            status: BookStatus::NotStarted,
        }
    }

    /// Parses the compact `title:pages:category` form used on the command line.
    ///
    /// The title may itself contain colons; the last two fields are taken as
    /// the page count and the category.
    pub fn parse_spec(spec: &str) -> Result<Self, String> {
        let mut parts = spec.rsplitn(3, ':');
        let category = parts.next().unwrap_or_default();
        let pages = parts.next().ok_or_else(|| format!("expected title:pages:category, got '{}'", spec))?;
        let title = parts.next().ok_or_else(|| format!("expected title:pages:category, got '{}'", spec))?;

        let title = title.trim();
        if title.is_empty() {
            return Err("book title cannot be empty".to_string());
        }
        let pages: u32 = pages
            .trim()
            .parse()
            .map_err(|_| format!("invalid page count '{}'", pages.trim()))?;
        let category = category.parse::<BookCategory>()?;

        Ok(Self::new(title, category, BookSize::Pages(pages)))
    }
}

/// Per-request reading preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Relative pace: 1.0 reads at the configured rates, 2.0 twice as fast.
    pub reading_speed: f64,
    pub weekdays: BTreeSet<WeekdaySet>,
    pub max_session_minutes: u32,
    pub start_date: Option<NaiveDate>,
}

impl UserProfile {
    pub fn new(weekdays: impl IntoIterator<Item = Weekday>, max_session_minutes: u32) -> Self {
        Self {
            reading_speed: 1.0,
            weekdays: weekdays.into_iter().map(WeekdaySet).collect(),
            max_session_minutes,
            start_date: None,
        }
    }

    pub fn with_speed(mut self, reading_speed: f64) -> Self {
        self.reading_speed = reading_speed;
        self
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn reads_on(&self, day: Weekday) -> bool {
        self.weekdays.contains(&WeekdaySet(day))
    }

    pub fn has_weekdays(&self) -> bool {
        !self.weekdays.is_empty()
    }
}

/// Ordered wrapper around `chrono::Weekday` (Monday first) so selected days
/// can live in a `BTreeSet` and serialize as short names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(pub Weekday);

impl PartialOrd for WeekdaySet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeekdaySet {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .num_days_from_monday()
            .cmp(&other.0.num_days_from_monday())
    }
}

/// Parses a weekday from an English or Spanish name or abbreviation.
pub fn parse_weekday(s: &str) -> Result<Weekday, String> {
    let lower = s.trim().to_lowercase();
    let day = match lower.as_str() {
        "lunes" | "lun" => Weekday::Mon,
        "martes" | "mar" => Weekday::Tue,
        "miércoles" | "miercoles" | "mié" | "mie" => Weekday::Wed,
        "jueves" | "jue" => Weekday::Thu,
        "viernes" | "vie" => Weekday::Fri,
        "sábado" | "sabado" | "sáb" | "sab" => Weekday::Sat,
        "domingo" | "dom" => Weekday::Sun,
        other => other
            .parse::<Weekday>()
            .map_err(|_| format!("unknown weekday: {}", s.trim()))?,
    };
    Ok(day)
}

/// Locale key for a weekday's display name.
pub fn weekday_locale_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "weekday.monday",
        Weekday::Tue => "weekday.tuesday",
        Weekday::Wed => "weekday.wednesday",
        Weekday::Thu => "weekday.thursday",
        Weekday::Fri => "weekday.friday",
        Weekday::Sat => "weekday.saturday",
        Weekday::Sun => "weekday.sunday",
    }
}
