//! iCalendar (RFC 5545) export of reading sessions.
//!
//! Each session becomes one VEVENT with a UUID-based UID, localized summary
//! and description, and a display alarm. Output uses CRLF line endings and
//! folds content lines longer than 75 octets.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::services::localization_engine::{params, LocalizationEngineTrait};
use crate::types::calendar::{CalendarEvent, EventAlarm};
use crate::types::errors::ExportError;
use crate::types::session::{ReadingSession, SessionKind};
use crate::types::settings::CalendarSettings;

const PRODID: &str = "-//planlector//Plan Lector//ES";
const MAX_LINE_OCTETS: usize = 75;
const STUDY_ALARM_MINUTES: u32 = 5;
const REVIEW_ALARM_MINUTES: u32 = 10;
const STUDY_PRIORITY: u8 = 5;
const REVIEW_PRIORITY: u8 = 3;

/// Trait defining the calendar exporter interface.
pub trait CalendarExporterTrait {
    fn to_events(&self, sessions: &[ReadingSession]) -> Result<Vec<CalendarEvent>, ExportError>;
    fn export(&self, sessions: &[ReadingSession]) -> Result<Vec<u8>, ExportError>;
}

/// Serializes sessions into an `.ics` document using the given translations.
pub struct CalendarExporter<'a> {
    settings: CalendarSettings,
    calendar_name: String,
    locale: &'a dyn LocalizationEngineTrait,
}

impl<'a> CalendarExporter<'a> {
    pub fn new(settings: CalendarSettings, locale: &'a dyn LocalizationEngineTrait) -> Self {
        let calendar_name = settings.calendar_name.clone();
        Self {
            settings,
            calendar_name,
            locale,
        }
    }

    /// Overrides the `X-WR-CALNAME` written into the document.
    pub fn with_calendar_name(mut self, name: impl Into<String>) -> Self {
        self.calendar_name = name.into();
        self
    }

    fn uid(&self) -> String {
        format!("{}@{}", Uuid::new_v4(), self.settings.uid_domain)
    }

    fn event_for(
        &self,
        session: &ReadingSession,
        remaining_before: u32,
        book_minutes: u32,
        completed_books: usize,
        dtstamp: DateTime<Utc>,
    ) -> Result<CalendarEvent, ExportError> {
        if session.duration_minutes() == 0 {
            return Err(ExportError::Serialization(format!(
                "session for '{}' on {} has no duration",
                session.book_title(),
                session.date()
            )));
        }
        let start = session.start().ok_or_else(|| {
            ExportError::Serialization(format!(
                "session for '{}' has no resolvable start",
                session.book_title()
            ))
        })?;
        let end = session.end().ok_or_else(|| {
            ExportError::Serialization(format!(
                "session for '{}' on {} has no resolvable end",
                session.book_title(),
                session.date()
            ))
        })?;

        let book = session.book_title().to_string();
        let duration = session.duration_minutes().to_string();
        let (summary, description, location, alarm_key, alarm_minutes) = match session.kind() {
            SessionKind::Study => (
                self.locale
                    .t("session.study_summary", Some(&params([("book", book.clone())]))),
                self.locale.t(
                    "session.study_description",
                    Some(&params([
                        ("book", book),
                        ("remaining", remaining_before.to_string()),
                        ("duration", duration),
                    ])),
                ),
                self.settings.study_location.clone(),
                "alarm.study",
                STUDY_ALARM_MINUTES,
            ),
            SessionKind::Review => (
                self.locale
                    .t("session.review_summary", Some(&params([("book", book.clone())]))),
                self.locale.t(
                    "session.review_description",
                    Some(&params([
                        ("book", book),
                        ("hours", format!("{:.2}", f64::from(book_minutes) / 60.0)),
                        ("duration", duration),
                    ])),
                ),
                self.settings.review_location.clone(),
                "alarm.review",
                REVIEW_ALARM_MINUTES,
            ),
            SessionKind::FinalReview => (
                self.locale.t("session.final_review_summary", None),
                self.locale.t(
                    "session.final_review_description",
                    Some(&params([("count", completed_books.to_string())])),
                ),
                self.settings.review_location.clone(),
                "alarm.review",
                REVIEW_ALARM_MINUTES,
            ),
        };

        let alarm = EventAlarm {
            minutes_before: alarm_minutes,
            description: self.locale.t(
                alarm_key,
                Some(&params([("minutes", alarm_minutes.to_string())])),
            ),
        };

        Ok(CalendarEvent {
            uid: self.uid(),
            dtstamp,
            start,
            end,
            summary,
            description,
            location,
            priority: if session.kind().is_review() {
                REVIEW_PRIORITY
            } else {
                STUDY_PRIORITY
            },
            alarms: vec![alarm],
        })
    }

    fn write_event(&self, event: &CalendarEvent, out: &mut Vec<String>) {
        out.push("BEGIN:VEVENT".to_string());
        out.push(format!("UID:{}", event.uid));
        out.push(format!("DTSTAMP:{}", format_utc(event.dtstamp)));
        out.push(format!("DTSTART:{}", format_local(event.start)));
        out.push(format!("DTEND:{}", format_local(event.end)));
        out.push(format!("SUMMARY:{}", escape_text(&event.summary)));
        out.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
        if let Some(email) = &self.settings.organizer_email {
            let name = self.settings.organizer_name.as_deref().unwrap_or(email);
            out.push(format!(
                "ORGANIZER;CN={}:mailto:{}",
                escape_param(name),
                email
            ));
        }
        out.push(format!("LOCATION:{}", escape_text(&event.location)));
        out.push("STATUS:CONFIRMED".to_string());
        out.push("SEQUENCE:0".to_string());
        out.push("TRANSP:OPAQUE".to_string());
        out.push("CLASS:PUBLIC".to_string());
        out.push(format!("PRIORITY:{}", event.priority));
        for alarm in &event.alarms {
            out.push("BEGIN:VALARM".to_string());
            out.push("ACTION:DISPLAY".to_string());
            out.push(format!("DESCRIPTION:{}", escape_text(&alarm.description)));
            out.push(format!("TRIGGER:-PT{}M", alarm.minutes_before));
            out.push("END:VALARM".to_string());
        }
        out.push("END:VEVENT".to_string());
    }
}

impl<'a> CalendarExporterTrait for CalendarExporter<'a> {
    /// Maps sessions one-to-one onto calendar events, in input order.
    fn to_events(&self, sessions: &[ReadingSession]) -> Result<Vec<CalendarEvent>, ExportError> {
        let mut book_totals: HashMap<&str, u32> = HashMap::new();
        let mut last_study: HashMap<&str, NaiveDate> = HashMap::new();
        for s in sessions.iter().filter(|s| s.kind() == SessionKind::Study) {
            *book_totals.entry(s.book_title()).or_insert(0) += s.duration_minutes();
            let last = last_study.entry(s.book_title()).or_insert(s.date());
            *last = (*last).max(s.date());
        }
        let mut consumed: HashMap<&str, u32> = HashMap::new();

        let dtstamp = Utc::now();
        let mut events = Vec::with_capacity(sessions.len());
        for s in sessions {
            let title = s.book_title();
            let total = book_totals.get(title).copied().unwrap_or(0);
            let used = consumed.entry(title).or_insert(0);
            let remaining_before = total.saturating_sub(*used);
            if s.kind() == SessionKind::Study {
                *used += s.duration_minutes();
            }
            // a book counts as finished from its last study day onwards
            let completed = last_study.values().filter(|d| **d <= s.date()).count();
            events.push(self.event_for(s, remaining_before, total, completed, dtstamp)?);
        }
        Ok(events)
    }

    fn export(&self, sessions: &[ReadingSession]) -> Result<Vec<u8>, ExportError> {
        let events = self.to_events(sessions)?;

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", PRODID),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            format!("X-WR-CALNAME:{}", escape_text(&self.calendar_name)),
            format!("X-WR-TIMEZONE:{}", self.settings.timezone),
        ];
        for event in &events {
            self.write_event(event, &mut lines);
        }
        lines.push("END:VCALENDAR".to_string());

        let mut output = String::new();
        for line in &lines {
            output.push_str(&fold_line(line));
            output.push_str("\r\n");
        }
        debug!(events = events.len(), bytes = output.len(), "calendar exported");
        Ok(output.into_bytes())
    }
}

/// Floating local time, e.g. `20240101T100000`.
pub fn format_local(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// UTC time with the `Z` suffix.
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes a TEXT value: backslash, semicolon, comma and newlines.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Parameter values cannot be escaped, so characters that would end the
/// parameter are quoted away.
fn escape_param(value: &str) -> String {
    if value.contains([':', ';', ',']) {
        format!("\"{}\"", value.replace('"', "'"))
    } else {
        value.to_string()
    }
}

/// Folds a content line at 75 octets without splitting UTF-8 sequences.
/// Continuation lines start with a single space.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut current = 0usize;
    let mut limit = MAX_LINE_OCTETS;
    for c in line.chars() {
        let width = c.len_utf8();
        if current + width > limit {
            out.push_str("\r\n ");
            current = 0;
            // the leading space counts towards the next line's 75 octets
            limit = MAX_LINE_OCTETS - 1;
        }
        out.push(c);
        current += width;
    }
    out
}
