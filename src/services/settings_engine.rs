//! Planner settings persisted as pretty-printed JSON.
//!
//! Values are addressed with dot keys (`schedule.max_session_minutes`) that
//! map onto JSON pointers into the serialized settings. Every write goes
//! through serde and then [`check_planner_settings`], so a file on disk always
//! holds settings the estimator and scheduler can run with.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::PlannerSettings;

const SETTINGS_FILE: &str = "settings.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<PlannerSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &PlannerSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

pub struct SettingsEngine {
    config_path: String,
    settings: PlannerSettings,
}

/// Turns `schedule.review_offsets` into `/schedule/review_offsets`.
fn pointer_for(key: &str) -> Result<String, SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    }
    Ok(key
        .split('.')
        .map(|part| format!("/{}", part.replace('~', "~0").replace('/', "~1")))
        .collect())
}

fn not_found(key: &str) -> SettingsError {
    SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
}

fn to_json(settings: &PlannerSettings) -> Result<Value, SettingsError> {
    serde_json::to_value(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })
}

/// Rejects settings that deserialize fine but would leave planning unusable.
pub fn check_planner_settings(settings: &PlannerSettings) -> Result<(), SettingsError> {
    let invalid = |msg: &str| -> Result<(), SettingsError> {
        Err(SettingsError::InvalidValue(msg.to_string()))
    };

    let schedule = &settings.schedule;
    if schedule.max_session_minutes == 0 {
        return invalid("schedule.max_session_minutes must be positive");
    }
    if schedule.default_weekdays.is_empty() {
        return invalid("schedule.default_weekdays needs at least one day");
    }

    let rates = &settings.rates;
    let per_page = [
        ("rates.popularization_seconds_per_page", rates.popularization_seconds_per_page),
        ("rates.theory_seconds_per_page", rates.theory_seconds_per_page),
        ("rates.analysis_seconds_per_page", rates.analysis_seconds_per_page),
        ("rates.default_reading_speed", rates.default_reading_speed),
    ];
    if let Some((name, _)) = per_page.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
        return Err(SettingsError::InvalidValue(format!(
            "{} must be a positive number",
            name
        )));
    }
    if rates.words_per_page == 0 {
        return invalid("rates.words_per_page must be positive");
    }

    if settings.content.cache_ttl_seconds == 0 || settings.content.max_cache_entries == 0 {
        return invalid("content cache ttl and size must be positive");
    }
    Ok(())
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `settings.json` in the
    /// platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join(SETTINGS_FILE)
                .to_string_lossy()
                .to_string()
        });
        Self {
            config_path,
            settings: PlannerSettings::default(),
        }
    }

    /// Reads a value by dot key; the empty key returns the whole document.
    pub fn get_value(&self, key: &str) -> Result<Value, SettingsError> {
        let json = to_json(&self.settings)?;
        if key.is_empty() {
            return Ok(json);
        }
        json.pointer(&pointer_for(key)?)
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    fn persist(&mut self, settings: PlannerSettings) -> Result<(), SettingsError> {
        check_planner_settings(&settings)?;
        self.settings = settings;
        self.save()
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// A missing file yields defaults. A file that fails to parse or holds
    /// unusable values is an error and leaves the current settings alone.
    fn load(&mut self) -> Result<PlannerSettings, SettingsError> {
        let path = Path::new(&self.config_path);
        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = PlannerSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        let settings: PlannerSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        if let Err(e) = check_planner_settings(&settings) {
            warn!(path = %self.config_path, error = %e, "settings file rejected");
            return Err(e);
        }

        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        info!(path = %self.config_path, "settings saved");
        Ok(())
    }

    fn get_settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Replaces one value and saves. Only keys already present in the
    /// serialized settings can be set; whole sections may be replaced too.
    /// Nothing changes in memory or on disk when the key or value is rejected.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let pointer = pointer_for(key)?;
        let mut json = to_json(&self.settings)?;
        let slot = json.pointer_mut(&pointer).ok_or_else(|| not_found(key))?;
        *slot = value;

        let updated: PlannerSettings = serde_json::from_value(json).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        self.persist(updated)
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.persist(PlannerSettings::default())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
