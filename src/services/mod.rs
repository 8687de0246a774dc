// planlector services
// Services provide core functionality: estimation, scheduling, calendar export, content, settings, localization.

pub mod calendar_exporter;
pub mod content_cache;
pub mod content_viewer;
pub mod localization_engine;
pub mod reading_estimator;
pub mod reading_planner;
pub mod session_scheduler;
pub mod settings_engine;
