//! Reading-time estimation.
//!
//! Converts a book's size into whole minutes of reading using the
//! per-category rates from settings and the reader's relative speed.

use tracing::debug;

use crate::types::book::{Book, BookSize, UserProfile};
use crate::types::errors::EstimateError;
use crate::types::settings::ReadingRates;

/// Trait defining the estimator interface.
pub trait ReadingEstimatorTrait {
    fn estimate(&self, book: &Book, profile: &UserProfile) -> Result<u32, EstimateError>;
    fn estimate_hours(&self, book: &Book, profile: &UserProfile) -> Result<f64, EstimateError>;
}

pub struct ReadingEstimator {
    rates: ReadingRates,
}

impl ReadingEstimator {
    pub fn new(rates: ReadingRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &ReadingRates {
        &self.rates
    }

    /// Effective reading days needed to cover `total_minutes` at a fixed
    /// daily pace. Returns `None` when the pace is zero.
    pub fn projected_days(total_minutes: u32, daily_minutes: u32) -> Option<f64> {
        if daily_minutes == 0 {
            return None;
        }
        Some(f64::from(total_minutes) / f64::from(daily_minutes))
    }
}

impl ReadingEstimatorTrait for ReadingEstimator {
    /// Returns the estimated reading time in whole minutes, rounded up.
    fn estimate(&self, book: &Book, profile: &UserProfile) -> Result<u32, EstimateError> {
        let speed = profile.reading_speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(EstimateError::InvalidInput(format!(
                "reading speed must be positive, got {}",
                speed
            )));
        }
        if book.size.is_zero() {
            return Err(EstimateError::InvalidInput(format!(
                "book '{}' has no size",
                book.title
            )));
        }

        let base_minutes = match book.size {
            BookSize::Minutes(m) => f64::from(m),
            BookSize::Pages(pages) => f64::from(pages) * self.rate_for(book)?,
            BookSize::Words(words) => {
                if self.rates.words_per_page == 0 {
                    return Err(EstimateError::InvalidInput(
                        "words per page must be positive".to_string(),
                    ));
                }
                let pages = f64::from(words) / f64::from(self.rates.words_per_page);
                pages * self.rate_for(book)?
            }
        };

        let minutes = (base_minutes / speed).ceil();
        if minutes > f64::from(u32::MAX) {
            return Err(EstimateError::InvalidInput(format!(
                "estimate for '{}' is out of range",
                book.title
            )));
        }

        debug!(title = %book.title, category = %book.category, minutes, "estimated reading time");
        Ok(minutes as u32)
    }

    fn estimate_hours(&self, book: &Book, profile: &UserProfile) -> Result<f64, EstimateError> {
        Ok(f64::from(self.estimate(book, profile)?) / 60.0)
    }
}

impl ReadingEstimator {
    fn rate_for(&self, book: &Book) -> Result<f64, EstimateError> {
        let rate = self.rates.minutes_per_page(book.category);
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EstimateError::InvalidInput(format!(
                "reading rate for {} must be positive",
                book.category
            )));
        }
        Ok(rate)
    }
}
