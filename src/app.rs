//! App Core for planlector.
//!
//! Central struct holding the managers and services one interactive session
//! works with.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Weekday;
use tracing::{info, warn};

use crate::managers::book_list_manager::BookListManager;
use crate::managers::document_store::SqliteDocumentStore;
use crate::platform;
use crate::services::calendar_exporter::CalendarExporter;
use crate::services::content_cache::{ConnectionCache, QueryCache, StoreTarget};
use crate::services::content_viewer::ContentViewer;
use crate::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use crate::services::reading_planner::ReadingPlanner;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::book::UserProfile;
use crate::types::settings::{ContentSettings, PlannerSettings};

/// Where the app reads its inputs from. `None` fields use the platform defaults.
#[derive(Debug, Clone, Default)]
pub struct AppPaths {
    pub settings_path: Option<String>,
    /// Directory holding `<locale>.json`; the bundled catalogues are used when unset.
    pub locales_dir: Option<PathBuf>,
    /// Overrides `content.database_path` from settings.
    pub content_store: Option<StoreTarget>,
}

/// Central application struct holding all managers and services.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub localization_engine: LocalizationEngine,
    pub book_list: BookListManager,
    pub content_viewer: ContentViewer<SqliteDocumentStore>,
    content_override: Option<StoreTarget>,
}

impl App {
    /// Creates a new App: loads settings, loads the translation catalogues and
    /// prepares the content viewer. The document store itself is opened lazily.
    pub fn new(paths: AppPaths) -> anyhow::Result<Self> {
        let mut settings_engine = SettingsEngine::new(paths.settings_path);
        settings_engine
            .load()
            .with_context(|| format!("loading settings from {}", settings_engine.get_config_path()))?;

        let mut localization_engine = match paths.locales_dir {
            Some(dir) => LocalizationEngine::new(dir),
            None => LocalizationEngine::bundled(),
        };
        localization_engine
            .initialize()
            .context("loading translation catalogues")?;

        let content_viewer =
            Self::build_content_viewer(&settings_engine.get_settings().content, paths.content_store.clone());

        let mut app = Self {
            settings_engine,
            localization_engine,
            book_list: BookListManager::new(),
            content_viewer,
            content_override: paths.content_store,
        };
        app.startup();
        Ok(app)
    }

    /// Startup sequence: apply the configured language, falling back to the system locale.
    pub fn startup(&mut self) {
        let language = self.settings_engine.get_settings().general.language.clone();
        if let Err(e) = self.localization_engine.set_locale(&language) {
            warn!(%language, error = %e, "configured language unavailable");
            let detected = self.localization_engine.detect_system_locale();
            let _ = self.localization_engine.set_locale(&detected);
        }
        info!(
            locale = self.localization_engine.get_locale(),
            settings = self.settings_engine.get_config_path(),
            "planlector ready"
        );
    }

    fn build_content_viewer(
        settings: &ContentSettings,
        override_target: Option<StoreTarget>,
    ) -> ContentViewer<SqliteDocumentStore> {
        let target = override_target.unwrap_or_else(|| match &settings.database_path {
            Some(path) => StoreTarget::File(PathBuf::from(path)),
            None => StoreTarget::File(platform::default_content_db()),
        });
        let cache = QueryCache::new(
            Duration::from_secs(settings.cache_ttl_seconds),
            settings.max_cache_entries,
        );
        ContentViewer::new(SqliteDocumentStore::new(ConnectionCache::new(target)), cache)
    }

    /// Rebuilds the content viewer after content settings changed. Drops both caches.
    pub fn reload_content_viewer(&mut self) {
        self.content_viewer = Self::build_content_viewer(
            &self.settings_engine.get_settings().content,
            self.content_override.clone(),
        );
    }

    pub fn settings(&self) -> &PlannerSettings {
        self.settings_engine.get_settings()
    }

    pub fn planner(&self) -> ReadingPlanner {
        ReadingPlanner::from_settings(self.settings())
    }

    pub fn exporter(&self) -> CalendarExporter<'_> {
        CalendarExporter::new(self.settings().calendar.clone(), &self.localization_engine)
    }

    /// Profile built from the configured defaults.
    pub fn default_profile(&self) -> UserProfile {
        let settings = self.settings();
        UserProfile::new(
            settings.schedule.default_weekdays.iter().copied(),
            settings.schedule.max_session_minutes,
        )
        .with_speed(settings.rates.default_reading_speed)
    }

    /// Profile with explicit weekdays, falling back to the defaults for anything unset.
    pub fn profile_with(
        &self,
        weekdays: Option<Vec<Weekday>>,
        max_session_minutes: Option<u32>,
        reading_speed: Option<f64>,
    ) -> UserProfile {
        let defaults = self.default_profile();
        let mut profile = match weekdays {
            Some(days) => UserProfile::new(days, defaults.max_session_minutes),
            None => defaults.clone(),
        };
        profile.max_session_minutes = max_session_minutes.unwrap_or(defaults.max_session_minutes);
        profile.reading_speed = reading_speed.unwrap_or(defaults.reading_speed);
        profile
    }
}
