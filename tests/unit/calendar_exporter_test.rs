//! Unit tests for the iCalendar exporter.

use chrono::{NaiveDate, NaiveTime, Weekday};
use pretty_assertions::assert_eq;

use planlector::services::calendar_exporter::{CalendarExporter, CalendarExporterTrait};
use planlector::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use planlector::services::session_scheduler::{
    PlannedBook, ScheduleWindow, SessionScheduler, SessionSchedulerTrait,
};
use planlector::types::book::UserProfile;
use planlector::types::errors::ExportError;
use planlector::types::session::{ReadingSession, SessionKind};
use planlector::types::settings::{CalendarSettings, ScheduleSettings};

fn locale() -> LocalizationEngine {
    let mut engine = LocalizationEngine::bundled();
    engine.initialize().unwrap();
    engine
}

fn session(title: &str, day: u32, hour: u32, minutes: u32, kind: SessionKind) -> ReadingSession {
    ReadingSession::new(
        title,
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        minutes,
        kind,
    )
}

fn sample_sessions() -> Vec<ReadingSession> {
    vec![
        session("Cosmos", 1, 10, 60, SessionKind::Study),
        session("Cosmos", 3, 10, 30, SessionKind::Study),
        session("Cosmos", 5, 19, 60, SessionKind::Review),
        session("", 5, 10, 30, SessionKind::FinalReview),
    ]
}

/// Joins folded lines back together.
fn unfold(ics: &str) -> String {
    ics.replace("\r\n ", "")
}

#[test]
fn test_one_event_per_session() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let events = exporter.to_events(&sample_sessions()).unwrap();

    assert_eq!(events.len(), 4);
    let priorities: Vec<u8> = events.iter().map(|e| e.priority).collect();
    assert_eq!(priorities, vec![5, 5, 3, 3]);
    let alarms: Vec<u32> = events.iter().map(|e| e.alarms[0].minutes_before).collect();
    assert_eq!(alarms, vec![5, 5, 10, 10]);
    assert_eq!(events[1].duration_minutes(), 30);
}

#[test]
fn test_localized_summaries_and_descriptions() {
    let mut locale = locale();
    {
        let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
        let events = exporter.to_events(&sample_sessions()).unwrap();
        assert_eq!(events[0].summary, "📚 LECTURA: Cosmos");
        assert!(events[0].description.contains("Tiempo restante del libro: 90 min"));
        assert!(events[1].description.contains("Tiempo restante del libro: 30 min"));
        assert_eq!(events[2].summary, "🔄 REVISIÓN COMPLETA: Cosmos");
        assert!(events[2].description.contains("1.50 horas"));
        assert_eq!(events[3].summary, "🎓 REVISIÓN GENERAL FINAL");
        assert!(events[3].description.contains("Libros completados: 1"));
        assert_eq!(events[0].location, "Sala de estudio");
    }

    locale.set_locale("en").unwrap();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let events = exporter.to_events(&sample_sessions()).unwrap();
    assert_eq!(events[0].summary, "📚 READING: Cosmos");
}

#[test]
fn test_final_review_counts_every_finished_book() {
    let mut locale = locale();
    locale.set_locale("en").unwrap();
    let scheduler = SessionScheduler::from_settings(&ScheduleSettings::default());
    let profile = UserProfile::new([Weekday::Mon, Weekday::Wed], 120);
    let window = ScheduleWindow {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: None,
        final_review: true,
    };
    let books = [PlannedBook::new("Cosmos", 30), PlannedBook::new("Ficciones", 30)];
    let outcome = scheduler.schedule_books(&books, &profile, &window).unwrap();
    assert_eq!(outcome.completions.len(), 2);

    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let events = exporter.to_events(&outcome.sessions).unwrap();
    let final_review = events
        .iter()
        .find(|e| e.summary.contains("FINAL"))
        .expect("final review event");
    assert!(
        final_review.description.ends_with("Books completed: 2"),
        "{}",
        final_review.description
    );
}

#[test]
fn test_final_review_ignores_books_still_in_progress() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let mut sessions = sample_sessions();
    sessions.push(session("Ficciones", 8, 10, 45, SessionKind::Study));
    let events = exporter.to_events(&sessions).unwrap();
    assert!(events[3].description.ends_with("Libros completados: 1"));
}

#[test]
fn test_uids_are_unique() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let events = exporter.to_events(&sample_sessions()).unwrap();

    let mut uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
    assert!(uids.iter().all(|u| u.ends_with("@planlector.local")));
    uids.sort();
    uids.dedup();
    assert_eq!(uids.len(), events.len());
}

#[test]
fn test_document_structure() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale)
        .with_calendar_name("Plan Lectura 2024");
    let ics = String::from_utf8(exporter.export(&sample_sessions()).unwrap()).unwrap();

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert!(!ics.replace("\r\n", "").contains('\n'), "bare LF in output");

    let text = unfold(&ics);
    assert!(text.contains("CALSCALE:GREGORIAN\r\n"));
    assert!(text.contains("X-WR-CALNAME:Plan Lectura 2024\r\n"));
    assert!(text.contains("X-WR-TIMEZONE:Europe/Madrid\r\n"));
    assert!(text.contains("DTSTART:20240101T100000\r\nDTEND:20240101T110000\r\n"));
    assert!(text.contains("TRIGGER:-PT5M\r\n"));
    assert!(text.contains("TRIGGER:-PT10M\r\n"));
    assert_eq!(text.matches("BEGIN:VEVENT").count(), 4);
    assert_eq!(text.matches("BEGIN:VALARM").count(), 4);
    assert!(!text.contains("ORGANIZER"));
}

#[test]
fn test_lines_are_folded() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let ics = String::from_utf8(exporter.export(&sample_sessions()).unwrap()).unwrap();
    for line in ics.split("\r\n") {
        assert!(line.len() <= 75, "line longer than 75 octets: {}", line);
    }
}

#[test]
fn test_organizer_written_when_email_set() {
    let locale = locale();
    let settings = CalendarSettings {
        organizer_name: Some("Lector".to_string()),
        organizer_email: Some("lector@example.com".to_string()),
        ..CalendarSettings::default()
    };
    let exporter = CalendarExporter::new(settings, &locale);
    let ics = unfold(&String::from_utf8(exporter.export(&sample_sessions()).unwrap()).unwrap());
    assert_eq!(
        ics.matches("ORGANIZER;CN=Lector:mailto:lector@example.com\r\n").count(),
        4
    );
}

#[test]
fn test_text_values_are_escaped() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let sessions = vec![session("Sapiens, de animales a dioses", 1, 10, 60, SessionKind::Study)];
    let ics = unfold(&String::from_utf8(exporter.export(&sessions).unwrap()).unwrap());
    assert!(ics.contains("SUMMARY:📚 LECTURA: Sapiens\\, de animales a dioses\r\n"));
}

#[test]
fn test_zero_duration_session_is_rejected() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let sessions = vec![session("Cosmos", 1, 10, 0, SessionKind::Study)];
    assert!(matches!(
        exporter.export(&sessions),
        Err(ExportError::Serialization(_))
    ));
}

#[test]
fn test_empty_schedule_is_an_empty_calendar() {
    let locale = locale();
    let exporter = CalendarExporter::new(CalendarSettings::default(), &locale);
    let ics = String::from_utf8(exporter.export(&[]).unwrap()).unwrap();
    assert!(!ics.contains("BEGIN:VEVENT"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
}
