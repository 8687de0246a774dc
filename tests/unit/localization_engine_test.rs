//! Unit tests for the LocalizationEngine public API.
//!
//! Covers catalogue loading and validation, Spanish/English plurals,
//! parameter interpolation, and the active → default → key fallback chain.

use std::collections::HashMap;
use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use planlector::services::localization_engine::{
    params, LocalizationEngine, LocalizationEngineTrait, DEFAULT_LOCALE,
};
use planlector::types::errors::LocaleError;

/// Writes es.json and en.json into `dir`. English deliberately lacks one key.
fn setup_locales(dir: &std::path::Path) {
    let es = serde_json::json!({
        "session": {
            "study_summary": "📚 LECTURA: {book}",
            "final_review_summary": "🎓 REVISIÓN GENERAL FINAL"
        },
        "plan": {
            "books_completed_one": "{count} libro completado",
            "books_completed_other": "{count} libros completados",
            "completion_row": "{book}: {hours} h, termina el {date}"
        }
    });

    let en = serde_json::json!({
        "session": {
            "study_summary": "📚 READING: {book}"
        },
        "plan": {
            "books_completed_one": "{count} book completed",
            "books_completed_other": "{count} books completed",
            "completion_row": "{book}: {hours} h, finishes on {date}"
        }
    });

    fs::write(dir.join("es.json"), serde_json::to_string_pretty(&es).unwrap()).unwrap();
    fs::write(dir.join("en.json"), serde_json::to_string_pretty(&en).unwrap()).unwrap();
}

fn initialized_engine(dir: &TempDir) -> LocalizationEngine {
    let mut engine = LocalizationEngine::new(dir.path());
    engine.initialize().unwrap();
    engine
}

// ---------------------------------------------------------------------------
// Plurals
// ---------------------------------------------------------------------------

#[rstest]
#[case("es", 1, "1 libro completado")]
#[case("es", 0, "0 libros completados")]
#[case("es", 3, "3 libros completados")]
#[case("en", 1, "1 book completed")]
#[case("en", 2, "2 books completed")]
fn test_plural_forms(#[case] locale: &str, #[case] count: u64, #[case] expected: &str) {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = initialized_engine(&dir);
    engine.set_locale(locale).unwrap();

    assert_eq!(engine.plural("plan.books_completed", count, None), expected);
}

#[test]
fn test_plural_without_forms_returns_key() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let engine = initialized_engine(&dir);
    assert_eq!(engine.plural("plan.nothing", 2, None), "plan.nothing");
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

#[test]
fn test_parameter_interpolation_multiple() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let engine = initialized_engine(&dir);

    let values = params([
        ("book", "Cosmos".to_string()),
        ("hours", "10.00".to_string()),
        ("date", "2024-02-01".to_string()),
    ]);
    assert_eq!(
        engine.t("plan.completion_row", Some(&values)),
        "Cosmos: 10.00 h, termina el 2024-02-01"
    );
}

#[test]
fn test_unknown_placeholder_left_untouched() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let engine = initialized_engine(&dir);

    let mut values = HashMap::new();
    values.insert("author".to_string(), "Borges".to_string());
    assert_eq!(
        engine.t("session.study_summary", Some(&values)),
        "📚 LECTURA: {book}"
    );
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

#[test]
fn test_default_locale_is_spanish() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let engine = initialized_engine(&dir);
    assert_eq!(DEFAULT_LOCALE, "es");
    assert_eq!(engine.get_locale(), "es");
}

#[test]
fn test_missing_key_falls_back_to_default_locale() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = initialized_engine(&dir);
    engine.set_locale("en").unwrap();

    assert_eq!(
        engine.t("session.final_review_summary", None),
        "🎓 REVISIÓN GENERAL FINAL"
    );
    assert_eq!(engine.missing_keys("en"), vec!["session.final_review_summary"]);
}

#[test]
fn test_missing_everywhere_returns_key() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let engine = initialized_engine(&dir);
    assert_eq!(engine.t("nonexistent.key", None), "nonexistent.key");
}

#[test]
fn test_locale_switching() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = initialized_engine(&dir);
    let values = params([("book", "Cosmos".to_string())]);

    assert_eq!(engine.t("session.study_summary", Some(&values)), "📚 LECTURA: Cosmos");
    engine.set_locale("en").unwrap();
    assert_eq!(engine.t("session.study_summary", Some(&values)), "📚 READING: Cosmos");
}

#[test]
fn test_unsupported_locale_keeps_current() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = initialized_engine(&dir);

    let result = engine.set_locale("fr");
    assert!(matches!(result, Err(LocaleError::UnsupportedLocale(_))));
    assert_eq!(engine.get_locale(), "es");
}

// ---------------------------------------------------------------------------
// Load-time validation
// ---------------------------------------------------------------------------

#[test]
fn test_non_string_leaf_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("es.json"),
        r#"{"plan": {"generated": 42}}"#,
    )
    .unwrap();

    let mut engine = LocalizationEngine::new(dir.path());
    match engine.initialize() {
        Err(LocaleError::InvalidValue(key)) => assert_eq!(key, "plan.generated"),
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_malformed_json_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("es.json"), "{ not json").unwrap();

    let mut engine = LocalizationEngine::new(dir.path());
    assert!(matches!(engine.initialize(), Err(LocaleError::ParseError(_))));
}

#[test]
fn test_missing_default_locale_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("en.json"), r#"{"a": "b"}"#).unwrap();

    let mut engine = LocalizationEngine::new(dir.path());
    assert!(matches!(engine.initialize(), Err(LocaleError::FileNotFound(_))));
}

#[test]
fn test_missing_directory_is_an_error() {
    let mut engine = LocalizationEngine::new("/nonexistent/locales");
    assert!(engine.initialize().is_err());
}

#[test]
fn test_bundled_catalogues_load() {
    let mut engine = LocalizationEngine::bundled();
    engine.initialize().unwrap();
    assert_eq!(engine.get_available_locales(), vec!["en", "es"]);
    assert_eq!(engine.t("weekday.monday", None), "Lunes");
    engine.set_locale("en").unwrap();
    assert_eq!(engine.t("weekday.monday", None), "Monday");
}
