use thiserror::Error;

// === EstimateError ===

/// Errors related to reading-time estimation.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// A user-supplied number (speed, size, rate) is out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// === ScheduleError ===

/// Errors related to session scheduling.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A user-supplied number or date is out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The profile selects no weekday to read on.
    #[error("No reading weekdays selected")]
    NoAvailableDays,
}

// === ExportError ===

/// Errors related to calendar export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A session could not be turned into a calendar event.
    #[error("Calendar serialization error: {0}")]
    Serialization(String),
}

// === ContentError ===

/// Errors related to the content viewer and its document store.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The document store could not be reached.
    #[error("Content store unavailable: {0}")]
    ExternalStore(String),
    /// A query against the document store failed.
    #[error("Content query failed: {0}")]
    Query(String),
}

// === BookListError ===

/// Errors related to the in-memory book list.
#[derive(Debug, Error)]
pub enum BookListError {
    /// Book with the given ID was not found.
    #[error("Book not found: {0}")]
    NotFound(String),
    /// The book data failed validation.
    #[error("Invalid book: {0}")]
    InvalidBook(String),
}

// === PlanError ===

/// Errors surfaced while generating a complete reading plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan has no books to schedule.
    #[error("Reading plan has no books")]
    EmptyBookList,
    /// The end date is not after the start date.
    #[error("Invalid plan window: {0}")]
    InvalidWindow(String),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === LocaleError ===

/// Errors related to localization engine operations.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// The requested locale is not supported.
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
    /// A catalogue value is not a string.
    #[error("Invalid locale value at '{0}'")]
    InvalidValue(String),
    /// The locale file was not found.
    #[error("Locale file not found: {0}")]
    FileNotFound(String),
    /// The locale file is not valid JSON.
    #[error("Locale parse error: {0}")]
    ParseError(String),
}
