use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::errors::LocaleError;

/// Supported locales.
const SUPPORTED_LOCALES: &[&str] = &["es", "en"];

/// Locale every lookup falls back to before returning the raw key.
pub const DEFAULT_LOCALE: &str = "es";

/// Catalogues compiled into the binary, used when no locales directory is given.
const BUNDLED: &[(&str, &str)] = &[
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// A validated locale: dot-notation key to display string.
pub type Catalogue = BTreeMap<String, String>;

/// Trait defining the localization engine interface.
pub trait LocalizationEngineTrait {
    fn initialize(&mut self) -> Result<(), LocaleError>;
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError>;
    fn get_locale(&self) -> &str;
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String;
    fn plural(&self, key: &str, count: u64, params: Option<&HashMap<String, String>>) -> String;
    fn detect_system_locale(&self) -> String;
    fn get_available_locales(&self) -> Vec<String>;
}

/// Where catalogues are read from.
enum Source {
    Directory(PathBuf),
    Bundled,
}

/// Localization engine for Spanish and English.
///
/// Catalogues are flattened and type-checked when loaded, so a lookup never
/// yields a non-string value. Missing keys resolve through the active
/// locale, then [`DEFAULT_LOCALE`], then the key itself.
pub struct LocalizationEngine {
    current_locale: String,
    locales: HashMap<String, Catalogue>,
    source: Source,
}

impl LocalizationEngine {
    /// Creates a new LocalizationEngine reading `<dir>/<locale>.json`.
    pub fn new(locales_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales: HashMap::new(),
            source: Source::Directory(locales_dir.into()),
        }
    }

    /// Creates a LocalizationEngine backed by the catalogues compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales: HashMap::new(),
            source: Source::Bundled,
        }
    }

    /// Parses one catalogue from JSON text and flattens it.
    pub fn parse_catalogue(content: &str) -> Result<Catalogue, LocaleError> {
        let data: Value =
            serde_json::from_str(content).map_err(|e| LocaleError::ParseError(e.to_string()))?;
        if !data.is_object() {
            return Err(LocaleError::ParseError(
                "catalogue root must be an object".to_string(),
            ));
        }
        let mut catalogue = Catalogue::new();
        Self::flatten(&data, "", &mut catalogue)?;
        Ok(catalogue)
    }

    /// Flattens nested objects into dot-notation keys, rejecting any leaf
    /// that is not a string.
    fn flatten(value: &Value, prefix: &str, out: &mut Catalogue) -> Result<(), LocaleError> {
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", prefix, k)
                    };
                    Self::flatten(v, &key, out)?;
                }
                Ok(())
            }
            Value::String(s) => {
                out.insert(prefix.to_string(), s.clone());
                Ok(())
            }
            _ => Err(LocaleError::InvalidValue(prefix.to_string())),
        }
    }

    /// Replaces `{param_name}` placeholders in a string with values from the params map.
    fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }

    /// Spanish and English share the same two plural categories.
    fn plural_form(count: u64) -> &'static str {
        if count == 1 {
            "one"
        } else {
            "other"
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.locales
            .get(&self.current_locale)
            .and_then(|c| c.get(key))
            .or_else(|| self.locales.get(DEFAULT_LOCALE).and_then(|c| c.get(key)))
            .map(String::as_str)
    }

    fn read_catalogue(&self, locale: &str) -> Result<Option<Catalogue>, LocaleError> {
        match &self.source {
            Source::Bundled => BUNDLED
                .iter()
                .find(|(name, _)| *name == locale)
                .map(|(_, content)| Self::parse_catalogue(content))
                .transpose(),
            Source::Directory(dir) => {
                let file_path = dir.join(format!("{}.json", locale));
                if !file_path.exists() {
                    return Ok(None);
                }
                let content = fs::read_to_string(&file_path).map_err(|e| {
                    LocaleError::FileNotFound(format!("{}: {}", file_path.to_string_lossy(), e))
                })?;
                Self::parse_catalogue(&content).map(Some).map_err(|e| match e {
                    LocaleError::ParseError(msg) => LocaleError::ParseError(format!(
                        "{}: {}",
                        file_path.to_string_lossy(),
                        msg
                    )),
                    other => other,
                })
            }
        }
    }

    /// Keys present in the default catalogue but missing from `locale`.
    pub fn missing_keys(&self, locale: &str) -> Vec<String> {
        let (Some(default), Some(other)) =
            (self.locales.get(DEFAULT_LOCALE), self.locales.get(locale))
        else {
            return Vec::new();
        };
        default
            .keys()
            .filter(|k| !other.contains_key(*k))
            .cloned()
            .collect()
    }
}

impl LocalizationEngineTrait for LocalizationEngine {
    /// Loads and validates every supported catalogue. The default locale is mandatory.
    fn initialize(&mut self) -> Result<(), LocaleError> {
        if let Source::Directory(dir) = &self.source {
            if !dir.exists() {
                return Err(LocaleError::FileNotFound(dir.to_string_lossy().to_string()));
            }
        }

        self.locales.clear();
        for locale in SUPPORTED_LOCALES {
            if let Some(catalogue) = self.read_catalogue(locale)? {
                debug!(locale, keys = catalogue.len(), "loaded locale catalogue");
                self.locales.insert(locale.to_string(), catalogue);
            }
        }

        if !self.locales.contains_key(DEFAULT_LOCALE) {
            return Err(LocaleError::FileNotFound(format!(
                "default locale '{}' not found",
                DEFAULT_LOCALE
            )));
        }

        for locale in SUPPORTED_LOCALES.iter().filter(|l| **l != DEFAULT_LOCALE) {
            let missing = self.missing_keys(locale);
            if !missing.is_empty() {
                warn!(locale, missing = missing.len(), "locale falls back to default for some keys");
            }
        }

        Ok(())
    }

    /// Switches the active locale. Returns an error if the locale is not supported
    /// or not loaded.
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError> {
        if !SUPPORTED_LOCALES.contains(&lang) {
            return Err(LocaleError::UnsupportedLocale(lang.to_string()));
        }
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::FileNotFound(format!(
                "Locale '{}' not loaded",
                lang
            )));
        }
        self.current_locale = lang.to_string();
        Ok(())
    }

    fn get_locale(&self) -> &str {
        &self.current_locale
    }

    /// Looks up a translation key and optionally interpolates parameters.
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String {
        let text = match self.lookup(key) {
            Some(s) => s,
            None => return key.to_string(),
        };

        match params {
            Some(p) => Self::interpolate(text, p),
            None => text.to_string(),
        }
    }

    /// Looks up `<key>_one` or `<key>_other` depending on `count`, falling
    /// back to `<key>_other`, then to the base key. `{count}` is always
    /// available as a parameter.
    fn plural(&self, key: &str, count: u64, params: Option<&HashMap<String, String>>) -> String {
        let plural_key = format!("{}_{}", key, Self::plural_form(count));

        let mut merged_params = params.cloned().unwrap_or_default();
        merged_params
            .entry("count".to_string())
            .or_insert_with(|| count.to_string());

        if self.lookup(&plural_key).is_some() {
            return self.t(&plural_key, Some(&merged_params));
        }
        let other_key = format!("{}_other", key);
        if self.lookup(&other_key).is_some() {
            return self.t(&other_key, Some(&merged_params));
        }
        key.to_string()
    }

    /// Detects the system locale from `LANG`, falling back to the default locale.
    fn detect_system_locale(&self) -> String {
        let lang = std::env::var("LANG").unwrap_or_default();

        // LANG is typically like "es_ES.UTF-8" or "en_US.UTF-8"
        let lang_code = lang
            .split('_')
            .next()
            .unwrap_or("")
            .split('.')
            .next()
            .unwrap_or("");

        if SUPPORTED_LOCALES.contains(&lang_code) {
            lang_code.to_string()
        } else {
            DEFAULT_LOCALE.to_string()
        }
    }

    fn get_available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.locales.keys().cloned().collect();
        locales.sort();
        locales
    }
}

/// Builds a params map from `(name, value)` pairs.
pub fn params<const N: usize>(pairs: [(&str, String); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
