//! Unit tests for the session scheduler: greedy day walk, review placement
//! and the multi-book window.

use chrono::{NaiveDate, NaiveTime, Weekday};
use pretty_assertions::assert_eq;

use planlector::services::session_scheduler::{
    PlannedBook, ReviewPolicy, ScheduleWindow, SessionScheduler, SessionSchedulerTrait,
};
use planlector::types::book::UserProfile;
use planlector::types::errors::ScheduleError;
use planlector::types::session::SessionKind;
use planlector::types::settings::ScheduleSettings;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn scheduler() -> SessionScheduler {
    SessionScheduler::from_settings(&ScheduleSettings::default())
}

fn mwf(max: u32) -> UserProfile {
    UserProfile::new([Weekday::Mon, Weekday::Wed, Weekday::Fri], max)
}

#[test]
fn test_single_book_walk_with_reviews() {
    // 2024-01-01 is a Monday
    let sessions = scheduler()
        .schedule("Cosmos", 200, &mwf(60), Some(date(1, 1)))
        .unwrap();

    let summary: Vec<(NaiveDate, NaiveTime, u32, SessionKind)> = sessions
        .iter()
        .map(|s| (s.date(), s.start_time(), s.duration_minutes(), s.kind()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (date(1, 1), time(10, 0), 60, SessionKind::Study),
            (date(1, 3), time(10, 0), 60, SessionKind::Study),
            (date(1, 5), time(10, 0), 60, SessionKind::Study),
            (date(1, 8), time(10, 0), 20, SessionKind::Study),
            (date(1, 10), time(19, 0), 60, SessionKind::Review),
            (date(1, 15), time(19, 0), 60, SessionKind::Review),
            (date(1, 24), time(19, 0), 60, SessionKind::Review),
        ]
    );
    assert!(sessions.iter().all(|s| s.book_title() == "Cosmos"));
}

#[test]
fn test_start_on_unselected_day_moves_forward() {
    // 2024-01-02 is a Tuesday
    let sessions = scheduler()
        .schedule("Cosmos", 60, &mwf(60), Some(date(1, 2)))
        .unwrap();
    assert_eq!(sessions[0].date(), date(1, 3));
}

#[test]
fn test_zero_minutes_yields_empty_schedule() {
    let sessions = scheduler()
        .schedule("Nada", 0, &mwf(60), Some(date(1, 1)))
        .unwrap();
    assert!(sessions.is_empty());
}

#[test]
fn test_profile_start_date_is_used_when_none_given() {
    let profile = mwf(60).starting(date(1, 3));
    let sessions = scheduler().schedule("Cosmos", 30, &profile, None).unwrap();
    assert_eq!(sessions[0].date(), date(1, 3));
}

#[test]
fn test_no_weekdays_is_an_error() {
    let profile = UserProfile::new(Vec::<Weekday>::new(), 60);
    assert!(matches!(
        scheduler().schedule("Cosmos", 100, &profile, Some(date(1, 1))),
        Err(ScheduleError::NoAvailableDays)
    ));
}

#[test]
fn test_zero_session_length_is_an_error() {
    assert!(matches!(
        scheduler().schedule("Cosmos", 100, &mwf(0), Some(date(1, 1))),
        Err(ScheduleError::InvalidInput(_))
    ));
}

#[test]
fn test_review_length_is_capped_by_session_length() {
    let sessions = scheduler()
        .schedule("Cosmos", 30, &mwf(45), Some(date(1, 1)))
        .unwrap();
    let reviews: Vec<_> = sessions
        .iter()
        .filter(|s| s.kind() == SessionKind::Review)
        .collect();
    assert_eq!(reviews.len(), 3);
    assert!(reviews.iter().all(|s| s.duration_minutes() == 45));
}

#[test]
fn test_without_review_policy_only_study_sessions() {
    let scheduler = SessionScheduler::new(ReviewPolicy::none(), time(9, 0), time(19, 0));
    let sessions = scheduler
        .schedule("Cosmos", 150, &mwf(60), Some(date(1, 1)))
        .unwrap();
    assert_eq!(sessions.len(), 3);
    assert!(sessions.iter().all(|s| s.kind() == SessionKind::Study));
    assert_eq!(sessions[0].start_time(), time(9, 0));
}

#[test]
fn test_books_share_a_day_back_to_back() {
    let books = vec![PlannedBook::new("A", 90), PlannedBook::new("B", 60)];
    let window = ScheduleWindow {
        start_date: Some(date(1, 1)),
        end_date: None,
        final_review: false,
    };
    let outcome = scheduler()
        .schedule_books(&books, &mwf(60), &window)
        .unwrap();

    let study: Vec<(&str, NaiveDate, NaiveTime, u32)> = outcome
        .sessions
        .iter()
        .filter(|s| s.kind() == SessionKind::Study)
        .map(|s| (s.book_title(), s.date(), s.start_time(), s.duration_minutes()))
        .collect();
    assert_eq!(
        study,
        vec![
            ("A", date(1, 1), time(10, 0), 60),
            ("A", date(1, 3), time(10, 0), 30),
            ("B", date(1, 3), time(10, 30), 30),
            ("B", date(1, 5), time(10, 0), 30),
        ]
    );
    assert_eq!(outcome.completions, vec![(0, date(1, 3)), (1, date(1, 5))]);
    assert!(outcome.unfinished.is_empty());
    assert_eq!(outcome.first_day, date(1, 1));
    assert_eq!(outcome.stopped_on, date(1, 6));
}

#[test]
fn test_final_review_fills_rest_of_last_day() {
    let books = vec![PlannedBook::new("A", 60), PlannedBook::new("B", 20)];
    let window = ScheduleWindow {
        start_date: Some(date(1, 1)),
        end_date: None,
        final_review: true,
    };
    let outcome = scheduler()
        .schedule_books(&books, &mwf(60), &window)
        .unwrap();

    let finals: Vec<_> = outcome
        .sessions
        .iter()
        .filter(|s| s.kind() == SessionKind::FinalReview)
        .collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].date(), date(1, 3));
    assert_eq!(finals[0].start_time(), time(10, 20));
    assert_eq!(finals[0].duration_minutes(), 40);
}

#[test]
fn test_end_date_leaves_books_unfinished() {
    let books = vec![PlannedBook::new("A", 120), PlannedBook::new("B", 120)];
    let window = ScheduleWindow {
        start_date: Some(date(1, 1)),
        end_date: Some(date(1, 5)),
        final_review: true,
    };
    let outcome = scheduler()
        .schedule_books(&books, &mwf(60), &window)
        .unwrap();

    assert_eq!(outcome.completions, vec![(0, date(1, 3))]);
    assert_eq!(outcome.unfinished, vec![1]);
    assert!(outcome
        .sessions
        .iter()
        .filter(|s| s.kind() == SessionKind::Study)
        .all(|s| s.date() <= date(1, 5)));
    assert!(!outcome
        .sessions
        .iter()
        .any(|s| s.kind() == SessionKind::FinalReview));
}

#[test]
fn test_end_before_start_is_an_error() {
    let window = ScheduleWindow {
        start_date: Some(date(1, 10)),
        end_date: Some(date(1, 1)),
        final_review: false,
    };
    assert!(matches!(
        scheduler().schedule_books(&[PlannedBook::new("A", 60)], &mwf(60), &window),
        Err(ScheduleError::InvalidInput(_))
    ));
}

#[test]
fn test_review_window_past_midnight_is_rejected() {
    let scheduler = SessionScheduler::new(ReviewPolicy::new([1], 60), time(10, 0), time(23, 30));
    assert!(matches!(
        scheduler.schedule("Cosmos", 60, &mwf(60), Some(date(1, 1))),
        Err(ScheduleError::InvalidInput(_))
    ));
}
