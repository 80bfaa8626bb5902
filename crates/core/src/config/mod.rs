//! Settings files for variables and notify levels
//!
//! This module loads a TOML settings file and pushes its contents into the
//! process-wide registries:
//! - `strict_defaults` toggles mismatched-default warnings
//! - `default_severity` sets the threshold used when no category sets one
//! - `[variables]` assigns runtime values by variable name
//!
//! # Example
//!
//! ```toml
//! strict_defaults = true
//! default_severity = "warning"
//!
//! [variables]
//! net-retries = 5
//! sync-video = false
//! window-title = "Panda"
//! load-display = ["pandagl", "tinydisplay"]
//! notify-level-display = "debug"
//! ```
//!
//! ```ignore
//! use knobs_core::config::Settings;
//!
//! let settings = Settings::load_from_env()?;
//! settings.apply();
//! ```

mod loader;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use knobs_types::Severity;

use crate::notify;
use crate::variables::{self, CONFIG};
use crate::{knobs_debug, knobs_info};

pub use loader::{
    default_settings_path, env_settings_path, settings_dir, settings_path, SETTINGS_ENV,
    SETTINGS_FILE_NAME,
};

/// Settings loader errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the settings file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize settings to TOML
    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine the settings directory from the executable location
    #[error("Settings directory not available - could not resolve executable path")]
    NoSettingsDirectory,
}

/// Result type for settings operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Value assigned to a variable in the `[variables]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Whitespace-separated words
    Word(String),
    /// Explicit word list
    Words(Vec<String>),
}

impl VariableValue {
    /// Words written to the variable core
    pub fn words(&self) -> Vec<String> {
        match self {
            VariableValue::Bool(true) => vec!["1".to_string()],
            VariableValue::Bool(false) => vec!["0".to_string()],
            VariableValue::Int(value) => vec![value.to_string()],
            VariableValue::Float(value) => vec![format!("{:?}", value)],
            VariableValue::Word(value) => {
                value.split_whitespace().map(str::to_string).collect()
            }
            VariableValue::Words(words) => words.clone(),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Word(value.to_string())
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(words: Vec<String>) -> Self {
        VariableValue::Words(words)
    }
}

/// Process-wide settings loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Report mismatched repeated defaults as warnings
    pub strict_defaults: bool,

    /// Threshold for categories with nothing set in their chain
    #[serde(with = "severity_name")]
    pub default_severity: Severity,

    /// Runtime values keyed by variable name
    pub variables: BTreeMap<String, VariableValue>,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize settings to TOML text
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from `path`
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings from `path`, or defaults if the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load settings from `KNOBS_SETTINGS` or the default location
    ///
    /// A missing default file yields default settings; a missing file
    /// named explicitly by the environment is an error.
    pub fn load_from_env() -> ConfigResult<Self> {
        match env_settings_path() {
            Some(path) => Self::load(path),
            None => Self::load_or_default(default_settings_path()?),
        }
    }

    /// Save settings to `path`
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        tracing::debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Set a variable value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<VariableValue>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Push these settings into the variable and category registries
    ///
    /// Variables are written through their cores, so existing wrappers see
    /// the new values on their next read. Category thresholds are then
    /// re-read from any `notify-level` variables.
    pub fn apply(&self) {
        variables::set_strict_defaults(self.strict_defaults);
        if !self.default_severity.is_unspecified() {
            notify::set_default_severity(self.default_severity);
        }

        for (name, value) in &self.variables {
            let words = value.words();
            knobs_debug!(CONFIG, "{} = '{}'", name, words.join(" "));
            variables::get_or_create(name).set_value(words);
        }

        notify::apply_config_levels();
        knobs_info!(CONFIG, "Applied {} variable settings", self.variables.len());
    }
}

/// Serialize severities by name
mod severity_name {
    use knobs_types::Severity;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(severity: &Severity, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(severity.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Severity, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{find_variable, ConfigBool, ConfigInt, ConfigList};
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_name(prefix: &str) -> String {
        format!(
            "{}-settings-{}",
            prefix,
            TEST_NAME_COUNTER.fetch_add(1, Ordering::Relaxed)
        )
    }

    #[test]
    fn test_parse_settings() {
        let settings = Settings::from_toml_str(
            r#"
            strict_defaults = true
            default_severity = "warning"

            [variables]
            net-retries = 5
            sync-video = false
            gamma = 1.5
            window-title = "Panda  Window"
            load-display = ["pandagl", "tinydisplay"]
            "#,
        )
        .unwrap();

        assert!(settings.strict_defaults);
        assert_eq!(settings.default_severity, Severity::Warning);
        assert_eq!(settings.variables["net-retries"].words(), vec!["5"]);
        assert_eq!(settings.variables["sync-video"].words(), vec!["0"]);
        assert_eq!(settings.variables["gamma"].words(), vec!["1.5"]);
        assert_eq!(
            settings.variables["window-title"].words(),
            vec!["Panda", "Window"]
        );
        assert_eq!(
            settings.variables["load-display"].words(),
            vec!["pandagl", "tinydisplay"]
        );
    }

    #[test]
    fn test_empty_settings() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.default_severity.is_unspecified());
    }

    #[test]
    fn test_invalid_severity_is_error() {
        let result = Settings::from_toml_str(r#"default_severity = "loud""#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_serialize() {
        let mut settings = Settings {
            default_severity: Severity::Debug,
            ..Default::default()
        };
        settings.set("window-title", "Panda");

        let toml_str = settings.to_toml_string().unwrap();
        assert!(toml_str.contains("default_severity = \"debug\""));
        assert!(toml_str.contains("window-title = \"Panda\""));
        assert_eq!(Settings::from_toml_str(&toml_str).unwrap(), settings);
    }

    #[test]
    fn test_apply_updates_existing_wrappers() {
        let retries_name = unique_name("retries");
        let video_name = unique_name("video");
        let list_name = unique_name("list");

        let retries = ConfigInt::new(&retries_name, 3, "");
        let video = ConfigBool::new(&video_name, true, "");
        let list = ConfigList::bind(&list_name);
        assert_eq!(retries.get_value(), 3);
        assert!(video.get_value());

        let mut settings = Settings::default();
        settings.set(retries_name.as_str(), VariableValue::Int(5));
        settings.set(video_name.as_str(), VariableValue::Bool(false));
        settings.set(list_name.as_str(), vec!["a".to_string(), "b".to_string()]);
        settings.apply();

        assert_eq!(retries.get_value(), 5);
        assert!(!video.get_value());
        assert_eq!(list.values(), vec!["a", "b"]);
        assert_eq!(retries.get_default_value(), 3);
        assert!(find_variable(&retries_name).unwrap().has_local_value());
    }

    #[test]
    fn test_apply_sets_category_levels() {
        let category_name = unique_name("category");
        let category = notify::get_category(&category_name, notify::CategoryParent::Root);
        category.set_severity(Severity::Error);

        let mut settings = Settings::default();
        settings.set(notify::level_variable_name(&category_name), "spam");
        settings.apply();

        assert_eq!(category.explicit_severity(), Severity::Spam);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(unique_name("knobs"))
            .join(SETTINGS_FILE_NAME);

        let mut settings = Settings {
            strict_defaults: true,
            ..Default::default()
        };
        settings.set("net-retries", VariableValue::Int(7));
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_load_missing() {
        let path = std::env::temp_dir().join(unique_name("missing"));
        assert!(matches!(Settings::load(&path), Err(ConfigError::IoError(_))));
        assert_eq!(Settings::load_or_default(&path).unwrap(), Settings::default());
    }
}
