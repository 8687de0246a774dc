use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// What a scheduled block of time is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Study,
    Review,
    /// Wrap-up session filling the rest of the last day once every book is done.
    FinalReview,
}

impl SessionKind {
    pub fn is_review(&self) -> bool {
        !matches!(self, SessionKind::Study)
    }
}

/// A single scheduled block of reading or review time.
///
/// Sessions are produced by the scheduler and are read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingSession {
    book_title: String,
    date: NaiveDate,
    start_time: NaiveTime,
    duration_minutes: u32,
    kind: SessionKind,
}

impl ReadingSession {
    pub fn new(
        book_title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
        kind: SessionKind,
    ) -> Self {
        Self {
            book_title: book_title.into(),
            date,
            start_time,
            duration_minutes,
            kind,
        }
    }

    pub fn book_title(&self) -> &str {
        &self.book_title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Start timestamp, or `None` if it cannot be represented.
    pub fn start(&self) -> Option<NaiveDateTime> {
        Some(self.date.and_time(self.start_time))
    }

    /// End timestamp, or `None` if start + duration overflows.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.start()?
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
    }
}

/// Completion record for one book in a generated plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookCompletion {
    pub title: String,
    pub hours: f64,
    pub completed_on: NaiveDate,
}

/// Aggregate numbers reported alongside a generated plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanStats {
    pub total_events: usize,
    pub study_sessions: usize,
    pub review_sessions: usize,
    pub books_completed_count: usize,
    pub total_book_hours: f64,
    pub total_days: i64,
}
