//! Session scheduling.
//!
//! Expands estimated reading minutes into dated sessions placed greedily on
//! the reader's selected weekdays, then injects spaced-repetition review
//! sessions after each book's last study session.
//!
//! Placement is a plain day walk: every selected weekday receives up to
//! `max_session_minutes` of study, the earliest day first, with no
//! backtracking and no redistribution of a short trailing session.

use std::collections::HashMap;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::types::book::UserProfile;
use crate::types::errors::ScheduleError;
use crate::types::session::{ReadingSession, SessionKind};
use crate::types::settings::ScheduleSettings;

/// Review offsets, counted in selected-weekday occurrences after the last
/// study session (1 = the next selected weekday).
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPolicy {
    offsets: Vec<u32>,
    review_minutes: u32,
}

impl ReviewPolicy {
    /// Zero offsets are dropped; the rest are sorted and deduplicated.
    pub fn new(offsets: impl IntoIterator<Item = u32>, review_minutes: u32) -> Self {
        let mut offsets: Vec<u32> = offsets.into_iter().filter(|o| *o > 0).collect();
        offsets.sort_unstable();
        offsets.dedup();
        Self {
            offsets,
            review_minutes,
        }
    }

    pub fn none() -> Self {
        Self::new(std::iter::empty::<u32>(), 0)
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn review_minutes(&self) -> u32 {
        self.review_minutes
    }
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self::new([1, 3, 7], 60)
    }
}

/// One book's share of a multi-book schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBook {
    pub title: String,
    pub total_minutes: u32,
}

impl PlannedBook {
    pub fn new(title: impl Into<String>, total_minutes: u32) -> Self {
        Self {
            title: title.into(),
            total_minutes,
        }
    }
}

/// Date bounds and extras for a multi-book schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleWindow {
    /// Overrides the profile's start date when set.
    pub start_date: Option<NaiveDate>,
    /// Inclusive last day for study sessions.
    pub end_date: Option<NaiveDate>,
    pub final_review: bool,
}

/// Result of a multi-book schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    /// All sessions ordered by date, then start time.
    pub sessions: Vec<ReadingSession>,
    /// `(book index, completion date)` for every finished book, in order.
    pub completions: Vec<(usize, NaiveDate)>,
    /// Indices of books that did not finish before the end date.
    pub unfinished: Vec<usize>,
    pub first_day: NaiveDate,
    /// Day after the last study day processed.
    pub stopped_on: NaiveDate,
}

/// Trait defining the scheduler interface.
pub trait SessionSchedulerTrait {
    fn schedule(
        &self,
        book_title: &str,
        total_minutes: u32,
        profile: &UserProfile,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<ReadingSession>, ScheduleError>;

    fn schedule_books(
        &self,
        books: &[PlannedBook],
        profile: &UserProfile,
        window: &ScheduleWindow,
    ) -> Result<ScheduleOutcome, ScheduleError>;
}

pub struct SessionScheduler {
    policy: ReviewPolicy,
    study_start: NaiveTime,
    review_start: NaiveTime,
}

impl SessionScheduler {
    pub fn new(policy: ReviewPolicy, study_start: NaiveTime, review_start: NaiveTime) -> Self {
        Self {
            policy,
            study_start,
            review_start,
        }
    }

    pub fn from_settings(settings: &ScheduleSettings) -> Self {
        Self::new(
            ReviewPolicy::new(settings.review_offsets.iter().copied(), settings.review_minutes),
            settings.study_start,
            settings.review_start,
        )
    }

    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    fn validate(&self, profile: &UserProfile) -> Result<(), ScheduleError> {
        if !profile.has_weekdays() {
            return Err(ScheduleError::NoAvailableDays);
        }
        if profile.max_session_minutes == 0 {
            return Err(ScheduleError::InvalidInput(
                "maximum session length must be positive".to_string(),
            ));
        }
        if time_after(self.study_start, profile.max_session_minutes).is_none() {
            return Err(ScheduleError::InvalidInput(format!(
                "a {} minute session starting at {} runs past midnight",
                profile.max_session_minutes, self.study_start
            )));
        }
        let review = self.policy.review_minutes.min(profile.max_session_minutes);
        if !self.policy.offsets.is_empty() && time_after(self.review_start, review).is_none() {
            return Err(ScheduleError::InvalidInput(format!(
                "a {} minute review starting at {} runs past midnight",
                review, self.review_start
            )));
        }
        Ok(())
    }

    fn next_day(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
        date.succ_opt()
            .ok_or_else(|| ScheduleError::InvalidInput("date out of range".to_string()))
    }

    /// Returns the first selected weekday strictly after `date`.
    fn next_selected_after(
        profile: &UserProfile,
        date: NaiveDate,
    ) -> Result<NaiveDate, ScheduleError> {
        let mut day = Self::next_day(date)?;
        while !profile.reads_on(day.weekday()) {
            day = Self::next_day(day)?;
        }
        Ok(day)
    }

    /// Returns the `n`-th selected weekday strictly after `date` (n >= 1).
    fn nth_selected_after(
        profile: &UserProfile,
        date: NaiveDate,
        n: u32,
    ) -> Result<NaiveDate, ScheduleError> {
        let mut day = date;
        for _ in 0..n {
            day = Self::next_selected_after(profile, day)?;
        }
        Ok(day)
    }

    /// Places the review sessions for a book completed on `completed_on`.
    ///
    /// Reviews sharing a date are stacked back-to-back from the review start
    /// time. A review that would run past midnight moves to the next selected
    /// weekday, and each review lands strictly after the previous one.
    fn place_reviews(
        &self,
        title: &str,
        completed_on: NaiveDate,
        profile: &UserProfile,
        review_load: &mut HashMap<NaiveDate, u32>,
        out: &mut Vec<ReadingSession>,
    ) -> Result<(), ScheduleError> {
        let duration = self.policy.review_minutes.min(profile.max_session_minutes);
        if duration == 0 {
            return Ok(());
        }

        let mut previous = completed_on;
        for &offset in &self.policy.offsets {
            let mut date = Self::nth_selected_after(profile, completed_on, offset)?;
            if date <= previous {
                date = Self::next_selected_after(profile, previous)?;
            }
            loop {
                let load = review_load.get(&date).copied().unwrap_or(0);
                match (
                    time_after(self.review_start, load),
                    time_after(self.review_start, load + duration),
                ) {
                    (Some(start), Some(_)) => {
                        out.push(ReadingSession::new(
                            title,
                            date,
                            start,
                            duration,
                            SessionKind::Review,
                        ));
                        review_load.insert(date, load + duration);
                        break;
                    }
                    _ => date = Self::next_selected_after(profile, date)?,
                }
            }
            previous = date;
        }
        Ok(())
    }
}

impl SessionSchedulerTrait for SessionScheduler {
    /// Schedules a single book. Zero minutes yields an empty schedule.
    fn schedule(
        &self,
        book_title: &str,
        total_minutes: u32,
        profile: &UserProfile,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<ReadingSession>, ScheduleError> {
        let window = ScheduleWindow {
            start_date,
            end_date: None,
            final_review: false,
        };
        let outcome =
            self.schedule_books(&[PlannedBook::new(book_title, total_minutes)], profile, &window)?;
        Ok(outcome.sessions)
    }

    /// Packs books in order into a shared daily budget of
    /// `max_session_minutes`. A book receives at most one study session per
    /// day; several books may share a day back-to-back.
    fn schedule_books(
        &self,
        books: &[PlannedBook],
        profile: &UserProfile,
        window: &ScheduleWindow,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        self.validate(profile)?;

        let first_day = window
            .start_date
            .or(profile.start_date)
            .unwrap_or_else(|| Local::now().date_naive());
        if let Some(end) = window.end_date {
            if end < first_day {
                return Err(ScheduleError::InvalidInput(format!(
                    "end date {} is before start date {}",
                    end, first_day
                )));
            }
        }

        let next_book = |from: usize| -> usize {
            (from..books.len())
                .find(|&i| books[i].total_minutes > 0)
                .unwrap_or(books.len())
        };

        let mut sessions = Vec::new();
        let mut completions = Vec::new();
        let mut review_load: HashMap<NaiveDate, u32> = HashMap::new();

        let mut index = next_book(0);
        let mut remaining = books.get(index).map(|b| b.total_minutes).unwrap_or(0);
        let mut date = first_day;

        while index < books.len() {
            if window.end_date.is_some_and(|end| date > end) {
                break;
            }

            if profile.reads_on(date.weekday()) {
                let mut used = 0u32;
                while used < profile.max_session_minutes && index < books.len() {
                    let chunk = remaining.min(profile.max_session_minutes - used);
                    let start = time_after(self.study_start, used).ok_or_else(|| {
                        ScheduleError::InvalidInput("study time out of range".to_string())
                    })?;
                    sessions.push(ReadingSession::new(
                        books[index].title.as_str(),
                        date,
                        start,
                        chunk,
                        SessionKind::Study,
                    ));
                    remaining -= chunk;
                    used += chunk;

                    if remaining == 0 {
                        debug!(title = %books[index].title, %date, "book completed");
                        completions.push((index, date));
                        self.place_reviews(
                            &books[index].title,
                            date,
                            profile,
                            &mut review_load,
                            &mut sessions,
                        )?;

                        index = next_book(index + 1);
                        remaining = books.get(index).map(|b| b.total_minutes).unwrap_or(0);

                        if index >= books.len()
                            && window.final_review
                            && used < profile.max_session_minutes
                        {
                            let start = time_after(self.study_start, used).ok_or_else(|| {
                                ScheduleError::InvalidInput("study time out of range".to_string())
                            })?;
                            sessions.push(ReadingSession::new(
                                "",
                                date,
                                start,
                                profile.max_session_minutes - used,
                                SessionKind::FinalReview,
                            ));
                        }
                    }
                }
            }

            date = Self::next_day(date)?;
        }

        let unfinished: Vec<usize> = (index..books.len())
            .filter(|&i| books[i].total_minutes > 0)
            .collect();

        sessions.sort_by_key(|s| (s.date(), s.start_time()));

        info!(
            books = books.len(),
            sessions = sessions.len(),
            completed = completions.len(),
            unfinished = unfinished.len(),
            "schedule generated"
        );

        Ok(ScheduleOutcome {
            sessions,
            completions,
            unfinished,
            first_day,
            stopped_on: date,
        })
    }
}

/// `start + minutes`, or `None` if that runs past midnight.
fn time_after(start: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (time, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    if wrapped != 0 {
        None
    } else {
        Some(time)
    }
}
