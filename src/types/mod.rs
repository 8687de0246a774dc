// planlector shared type definitions
// Each submodule defines types used across the application.

pub mod book;
pub mod calendar;
pub mod content;
pub mod errors;
pub mod session;
pub mod settings;
