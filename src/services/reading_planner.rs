//! Multi-book reading plans.
//!
//! Estimates every book, packs the books in order into the reader's daily
//! budget, and reports completion dates and plan statistics. Export to
//! iCalendar goes through any [`CalendarExporterTrait`].

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::services::calendar_exporter::CalendarExporterTrait;
use crate::services::localization_engine::{params, LocalizationEngineTrait};
use crate::services::reading_estimator::{ReadingEstimator, ReadingEstimatorTrait};
use crate::services::session_scheduler::{
    PlannedBook, ScheduleWindow, SessionScheduler, SessionSchedulerTrait,
};
use crate::types::book::{Book, BookStatus, UserProfile};
use crate::types::errors::{PlanError, ScheduleError};
use crate::types::session::{BookCompletion, PlanStats, ReadingSession};
use crate::types::settings::PlannerSettings;

/// Estimated reading time for one book of a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookEstimate {
    pub title: String,
    pub minutes: u32,
}

/// A generated plan: sessions plus what they add up to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingPlan {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub estimates: Vec<BookEstimate>,
    pub sessions: Vec<ReadingSession>,
    pub completions: Vec<BookCompletion>,
    /// Titles of books that do not fit before the end date.
    pub unfinished: Vec<String>,
    pub stats: PlanStats,
}

impl ReadingPlan {
    pub fn is_complete(&self) -> bool {
        self.unfinished.is_empty()
    }

    /// Date the last book is finished, if every book is.
    pub fn finished_on(&self) -> Option<NaiveDate> {
        if self.is_complete() {
            self.completions.last().map(|c| c.completed_on)
        } else {
            None
        }
    }
}

pub struct ReadingPlanner {
    estimator: ReadingEstimator,
    scheduler: SessionScheduler,
    final_review: bool,
}

impl ReadingPlanner {
    pub fn new(estimator: ReadingEstimator, scheduler: SessionScheduler, final_review: bool) -> Self {
        Self {
            estimator,
            scheduler,
            final_review,
        }
    }

    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self::new(
            ReadingEstimator::new(settings.rates.clone()),
            SessionScheduler::from_settings(&settings.schedule),
            settings.schedule.final_review,
        )
    }

    pub fn estimator(&self) -> &ReadingEstimator {
        &self.estimator
    }

    pub fn scheduler(&self) -> &SessionScheduler {
        &self.scheduler
    }

    /// Estimates each book without scheduling anything.
    pub fn estimate_all(
        &self,
        books: &[Book],
        profile: &UserProfile,
    ) -> Result<Vec<BookEstimate>, PlanError> {
        books
            .iter()
            .map(|book| {
                Ok(BookEstimate {
                    title: book.title.clone(),
                    minutes: self.estimator.estimate(book, profile)?,
                })
            })
            .collect()
    }

    /// Builds a plan for every book not already marked completed.
    ///
    /// The walk starts at the profile's start date (today if unset) and, when
    /// `end_date` is given, places no study session after it.
    pub fn plan(
        &self,
        books: &[Book],
        profile: &UserProfile,
        end_date: Option<NaiveDate>,
    ) -> Result<ReadingPlan, PlanError> {
        let pending: Vec<Book> = books
            .iter()
            .filter(|b| b.status != BookStatus::Completed)
            .cloned()
            .collect();
        if pending.is_empty() {
            return Err(PlanError::EmptyBookList);
        }

        let start_date = profile
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());
        if let Some(end) = end_date {
            if end <= start_date {
                return Err(PlanError::InvalidWindow(format!(
                    "end date {} must be after start date {}",
                    end, start_date
                )));
            }
        }

        let estimates = self.estimate_all(&pending, profile)?;
        let planned: Vec<PlannedBook> = estimates
            .iter()
            .map(|e| PlannedBook::new(e.title.as_str(), e.minutes))
            .collect();
        debug!(books = planned.len(), %start_date, ?end_date, "planning");

        let window = ScheduleWindow {
            start_date: Some(start_date),
            end_date,
            final_review: self.final_review,
        };
        let outcome = self.scheduler.schedule_books(&planned, profile, &window)?;

        let completions: Vec<BookCompletion> = outcome
            .completions
            .iter()
            .map(|&(index, completed_on)| BookCompletion {
                title: estimates[index].title.clone(),
                hours: round_hours(minutes_to_hours(estimates[index].minutes)),
                completed_on,
            })
            .collect();
        let unfinished: Vec<String> = outcome
            .unfinished
            .iter()
            .map(|&index| estimates[index].title.clone())
            .collect();

        let review_sessions = outcome
            .sessions
            .iter()
            .filter(|s| s.kind().is_review())
            .count();
        let stats = PlanStats {
            total_events: outcome.sessions.len(),
            study_sessions: outcome.sessions.len() - review_sessions,
            review_sessions,
            books_completed_count: completions.len(),
            total_book_hours: estimates
                .iter()
                .map(|e| minutes_to_hours(e.minutes))
                .sum(),
            total_days: (outcome.stopped_on - outcome.first_day).num_days(),
        };

        info!(
            events = stats.total_events,
            completed = stats.books_completed_count,
            unfinished = unfinished.len(),
            "reading plan generated"
        );

        Ok(ReadingPlan {
            start_date,
            end_date,
            estimates,
            sessions: outcome.sessions,
            completions,
            unfinished,
            stats,
        })
    }

    /// Serializes the plan's sessions with the given exporter.
    pub fn export(
        &self,
        plan: &ReadingPlan,
        exporter: &dyn CalendarExporterTrait,
    ) -> Result<Vec<u8>, PlanError> {
        Ok(exporter.export(&plan.sessions)?)
    }
}

/// User-facing message for a planning failure in the active locale.
pub fn describe_error(err: &PlanError, locale: &dyn LocalizationEngineTrait) -> String {
    match err {
        PlanError::EmptyBookList => locale.t("errors.no_books", None),
        PlanError::InvalidWindow(_) => locale.t("errors.invalid_window", None),
        PlanError::Schedule(ScheduleError::NoAvailableDays) => locale.t("errors.no_weekdays", None),
        PlanError::Estimate(_) | PlanError::Schedule(_) => {
            locale.t("errors.invalid_input", Some(&params([("detail", err.to_string())])))
        }
        PlanError::Export(_) => locale.t("errors.generic", None),
    }
}

fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
