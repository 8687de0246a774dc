//! RPC method handler for the planlector JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function validates request parameters and dispatches
//! to the managers and services held by the `App` struct.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::book_list_manager::{BookListManagerTrait, BookUpdate};
use crate::services::content_viewer::ContentViewerTrait;
use crate::services::localization_engine::{params as locale_params, LocalizationEngineTrait};
use crate::services::reading_estimator::ReadingEstimator;
use crate::services::reading_planner::describe_error;
use crate::services::session_scheduler::SessionSchedulerTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::book::{parse_weekday, BookCategory, BookSize, BookStatus};
use crate::types::content::ContentFilter;
use crate::types::errors::LocaleError;

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(input)
        .map_err(|e| format!("base64 decode error: {}", e))
}

// ─── Parameter helpers ───

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn opt_str<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(|v| v.as_str())
}

/// A strictly positive integer parameter, if present.
fn opt_positive_u32(params: &Value, name: &str) -> Result<Option<u32>, String> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("{} must be a positive integer", name)),
    }
}

fn opt_positive_f64(params: &Value, name: &str) -> Result<Option<f64>, String> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(Some)
            .ok_or_else(|| format!("{} must be a positive number", name)),
    }
}

fn opt_date(params: &Value, name: &str) -> Result<Option<NaiveDate>, String> {
    opt_str(params, name)
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| format!("{} must be a YYYY-MM-DD date, got '{}'", name, s))
        })
        .transpose()
}

fn opt_weekdays(params: &Value) -> Result<Option<Vec<Weekday>>, String> {
    match params.get("weekdays") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| "weekdays must be strings".to_string())
                    .and_then(parse_weekday)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err("weekdays must be an array".to_string()),
    }
}

fn opt_category(params: &Value) -> Result<Option<BookCategory>, String> {
    opt_str(params, "category")
        .map(str::parse::<BookCategory>)
        .transpose()
}

/// Exactly one of `pages`, `words` or `minutes`, when any is present.
fn opt_size(params: &Value) -> Result<Option<BookSize>, String> {
    let sizes = [
        opt_positive_u32(params, "pages")?.map(BookSize::Pages),
        opt_positive_u32(params, "words")?.map(BookSize::Words),
        opt_positive_u32(params, "minutes")?.map(BookSize::Minutes),
    ];
    let mut given = sizes.into_iter().flatten();
    match (given.next(), given.next()) {
        (size, None) => Ok(size),
        (_, Some(_)) => Err("give only one of pages, words or minutes".to_string()),
    }
}

fn opt_status(params: &Value) -> Result<Option<BookStatus>, String> {
    params
        .get("status")
        .filter(|v| !v.is_null())
        .map(|v| serde_json::from_value(v.clone()).map_err(|e| format!("invalid status: {}", e)))
        .transpose()
}

fn content_filter(params: &Value) -> Option<ContentFilter> {
    let filter = ContentFilter {
        category: opt_str(params, "category").map(str::to_string),
        tag: opt_str(params, "tag").map(str::to_string),
    };
    (filter != ContentFilter::default()).then_some(filter)
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Books ───
        "books.add" => {
            let title = str_param(params, "title")?;
            let category = opt_category(params)?.ok_or("missing category")?;
            let size = opt_size(params)?.ok_or("missing pages, words or minutes")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = a
                .book_list
                .add_book(title, category, size)
                .map_err(|e| e.to_string())?;
            let book = a.book_list.get_book(&id).ok_or("book vanished")?;
            serde_json::to_value(book).map_err(|e| e.to_string())
        }
        "books.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let books = serde_json::to_value(a.book_list.list_books()).map_err(|e| e.to_string())?;
            Ok(json!({"items": books, "count": a.book_list.book_count()}))
        }
        "books.update" => {
            let id = str_param(params, "id")?;
            let update = BookUpdate {
                title: opt_str(params, "title").map(str::to_string),
                category: opt_category(params)?,
                size: opt_size(params)?,
                status: opt_status(params)?,
            };
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.book_list.update_book(id, update).map_err(|e| e.to_string())?;
            let book = a.book_list.get_book(id).ok_or("book vanished")?;
            serde_json::to_value(book).map_err(|e| e.to_string())
        }
        "books.remove" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.book_list.remove_book(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "books.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.book_list.clear();
            Ok(json!({"ok": true}))
        }

        // ─── Planning ───
        "plan.estimate" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let profile = a.profile_with(
                None,
                opt_positive_u32(params, "max_session_minutes")?,
                opt_positive_f64(params, "reading_speed")?,
            );
            let planner = a.planner();
            let estimates = planner
                .estimate_all(a.book_list.list_books(), &profile)
                .map_err(|e| describe_error(&e, &a.localization_engine))?;
            let total: u32 = estimates.iter().map(|e| e.minutes).sum();
            let items: Vec<Value> = estimates
                .iter()
                .map(|e| {
                    json!({
                        "title": e.title,
                        "minutes": e.minutes,
                        "hours": f64::from(e.minutes) / 60.0,
                        "days": ReadingEstimator::projected_days(e.minutes, profile.max_session_minutes),
                    })
                })
                .collect();
            Ok(json!({
                "items": items,
                "total_minutes": total,
                "projected_days": ReadingEstimator::projected_days(total, profile.max_session_minutes),
            }))
        }
        "plan.schedule" => {
            let title = str_param(params, "title")?;
            let minutes = params
                .get("total_minutes")
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .ok_or("total_minutes must be a non-negative integer")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let profile = a.profile_with(
                opt_weekdays(params)?,
                opt_positive_u32(params, "max_session_minutes")?,
                None,
            );
            let sessions = a
                .planner()
                .scheduler()
                .schedule(title, minutes, &profile, opt_date(params, "start_date")?)
                .map_err(|e| e.to_string())?;
            serde_json::to_value(sessions).map_err(|e| e.to_string())
        }
        "plan.generate" => {
            let weekdays = opt_weekdays(params)?;
            let max_session = opt_positive_u32(params, "max_session_minutes")?;
            let speed = opt_positive_f64(params, "reading_speed")?;
            let start_date = opt_date(params, "start_date")?;
            let end_date = opt_date(params, "end_date")?;

            let a = app.lock().map_err(|e| e.to_string())?;
            let mut profile = a.profile_with(weekdays, max_session, speed);
            if let Some(start) = start_date {
                profile = profile.starting(start);
            }
            let planner = a.planner();
            let plan = planner
                .plan(a.book_list.list_books(), &profile, end_date)
                .map_err(|e| describe_error(&e, &a.localization_engine))?;

            let calendar_name = a.localization_engine.t(
                "app.calendar_name",
                Some(&locale_params([("year", plan.start_date.year().to_string())])),
            );
            let exporter = a.exporter().with_calendar_name(calendar_name);
            let ics = planner
                .export(&plan, &exporter)
                .map_err(|e| describe_error(&e, &a.localization_engine))?;

            let message = if plan.stats.total_events == 0 {
                a.localization_engine.t("plan.no_events", None)
            } else {
                a.localization_engine.t(
                    "plan.generated",
                    Some(&locale_params([("count", plan.stats.total_events.to_string())])),
                )
            };
            Ok(json!({
                "message": message,
                "ics": base64_encode(&ics),
                "filename": format!("plan_lectura_{}.ics", plan.start_date.format("%Y%m%d")),
                "stats": plan.stats,
                "completions": plan.completions,
                "unfinished": plan.unfinished,
                "finished_on": plan.finished_on(),
            }))
        }

        // ─── Content ───
        "content.list" => {
            let filter = content_filter(params);
            let a = app.lock().map_err(|e| e.to_string())?;
            let docs = a
                .content_viewer
                .fetch_published(filter.as_ref())
                .map_err(|e| e.to_string())?;
            let items = serde_json::to_value(docs.as_slice()).map_err(|e| e.to_string())?;
            Ok(json!({"items": items, "count": docs.len()}))
        }
        "content.random" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            match a.content_viewer.fetch_random().map_err(|e| e.to_string())? {
                Some(doc) => Ok(json!({"document": doc})),
                None => Ok(json!({
                    "document": null,
                    "message": a.localization_engine.t("content.empty", None),
                })),
            }
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine
                .get_value(opt_str(params, "key").unwrap_or(""))
                .map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if key == "general.language" {
                let lang = value.as_str().ok_or("language must be a string")?;
                if !a
                    .localization_engine
                    .get_available_locales()
                    .iter()
                    .any(|l| l == lang)
                {
                    return Err(LocaleError::UnsupportedLocale(lang.to_string()).to_string());
                }
            }
            a.settings_engine
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            if key == "general.language" {
                let lang = a.settings().general.language.clone();
                a.localization_engine
                    .set_locale(&lang)
                    .map_err(|e| e.to_string())?;
            }
            if key.starts_with("content.") {
                a.reload_content_viewer();
            }
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            a.reload_content_viewer();
            a.startup();
            Ok(json!({"ok": true}))
        }

        // ─── Localization ───
        "i18n.t" => {
            let key = str_param(params, "key")?;
            let values: Option<HashMap<String, String>> = match params.get("params") {
                None | Some(Value::Null) => None,
                Some(Value::Object(map)) => Some(
                    map.iter()
                        .map(|(k, v)| {
                            let text = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                            (k.clone(), text)
                        })
                        .collect(),
                ),
                Some(_) => return Err("params must be an object".to_string()),
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let text = a.localization_engine.t(key, values.as_ref());
            Ok(json!({"text": text}))
        }
        "i18n.locale" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({
                "locale": a.localization_engine.get_locale(),
                "available": a.localization_engine.get_available_locales(),
            }))
        }
        "i18n.set_locale" => {
            let locale = str_param(params, "locale")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.localization_engine
                .set_locale(locale)
                .map_err(|e| e.to_string())?;
            Ok(json!({"locale": locale}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
