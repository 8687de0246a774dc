//! Property-based tests for settings persistence.
//!
//! Any valid `PlannerSettings` written through the engine must come back
//! unchanged after a reload from disk.

use chrono::{NaiveTime, Weekday};
use proptest::prelude::*;
use tempfile::TempDir;

use planlector::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use planlector::types::settings::{
    CalendarSettings, ContentSettings, GeneralSettings, PlannerSettings, ReadingRates,
    ScheduleSettings,
};

fn arb_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    prop_oneof![
        Just(Weekday::Mon),
        Just(Weekday::Tue),
        Just(Weekday::Wed),
        Just(Weekday::Thu),
        Just(Weekday::Fri),
        Just(Weekday::Sat),
        Just(Weekday::Sun),
    ]
}

fn arb_schedule() -> impl Strategy<Value = ScheduleSettings> {
    (
        arb_time(),
        arb_time(),
        1u32..=480,
        0u32..=240,
        proptest::collection::vec(1u32..=30, 0..5),
        proptest::collection::vec(arb_weekday(), 1..7),
        any::<bool>(),
    )
        .prop_map(
            |(study_start, review_start, max_session_minutes, review_minutes, review_offsets, default_weekdays, final_review)| {
                ScheduleSettings {
                    study_start,
                    review_start,
                    max_session_minutes,
                    review_minutes,
                    review_offsets,
                    default_weekdays,
                    final_review,
                }
            },
        )
}

fn arb_rates() -> impl Strategy<Value = ReadingRates> {
    // whole seconds and tenths keep the JSON float text exact
    (1u32..=600, 1u32..=600, 1u32..=600, 1u32..=1000, 1u32..=40).prop_map(
        |(pop, theory, analysis, words_per_page, speed_tenths)| ReadingRates {
            popularization_seconds_per_page: f64::from(pop),
            theory_seconds_per_page: f64::from(theory),
            analysis_seconds_per_page: f64::from(analysis),
            words_per_page,
            default_reading_speed: f64::from(speed_tenths) / 10.0,
        },
    )
}

fn arb_calendar() -> impl Strategy<Value = CalendarSettings> {
    (
        "[A-Za-zñáé ]{1,30}",
        prop_oneof![Just("Europe/Madrid".to_string()), Just("UTC".to_string())],
        proptest::option::of("[A-Za-z ]{1,20}"),
        proptest::option::of("[a-z]{1,10}@[a-z]{1,10}\\.org"),
        "[A-Za-z ]{1,30}",
        "[A-Za-z ]{1,30}",
        "[a-z]{1,10}\\.local",
    )
        .prop_map(
            |(calendar_name, timezone, organizer_name, organizer_email, study_location, review_location, uid_domain)| {
                CalendarSettings {
                    calendar_name,
                    timezone,
                    organizer_name,
                    organizer_email,
                    study_location,
                    review_location,
                    uid_domain,
                }
            },
        )
}

fn arb_content() -> impl Strategy<Value = ContentSettings> {
    (proptest::option::of("/[a-z]{1,10}/content\\.db"), 1u64..=86_400, 1u64..=1_000).prop_map(
        |(database_path, cache_ttl_seconds, max_cache_entries)| ContentSettings {
            database_path,
            cache_ttl_seconds,
            max_cache_entries,
        },
    )
}

fn arb_settings() -> impl Strategy<Value = PlannerSettings> {
    (
        prop_oneof![Just("es".to_string()), Just("en".to_string())],
        arb_schedule(),
        arb_rates(),
        arb_calendar(),
        arb_content(),
    )
        .prop_map(|(language, schedule, rates, calendar, content)| PlannerSettings {
            general: GeneralSettings { language },
            schedule,
            rates,
            calendar,
            content,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn settings_survive_save_and_reload(settings in arb_settings()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();

        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.load().unwrap();
        for (section, value) in serde_json::to_value(&settings).unwrap().as_object().unwrap() {
            engine.set_value(section, value.clone()).unwrap();
        }
        prop_assert_eq!(engine.get_settings(), &settings);

        let mut reloaded = SettingsEngine::new(Some(path));
        prop_assert_eq!(reloaded.load().unwrap(), settings);
    }
}
