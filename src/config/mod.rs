//! Store configuration
//!
//! A JSON document naming where the preference file lives and how the
//! store behaves when it cannot be read:
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/prefdb",
//!   "file_name": "prefdb-app-prefs.json",
//!   "on_load_failure": "fail",
//!   "log_level": "info",
//!   "dynamic_colors": true
//! }
//! ```
//!
//! Only `data_dir` is required.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::store::LoadFailurePolicy;

/// Default preference file name
pub const DEFAULT_FILE_NAME: &str = "prefdb-app-prefs.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the preference file (required)
    pub data_dir: PathBuf,

    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// What a failed read does: "fail" or "defaults"
    #[serde(default)]
    pub on_load_failure: LoadFailurePolicy,

    /// Minimum log severity: "trace", "info", "warn", "error" or "fatal"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Platform supplies dynamic accent colors
    #[serde(default = "default_dynamic_colors")]
    pub dynamic_colors: bool,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_dynamic_colors() -> bool {
    true
}

impl StoreConfig {
    /// Configuration with every optional field defaulted.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: default_file_name(),
            on_load_failure: LoadFailurePolicy::default(),
            log_level: default_log_level(),
            dynamic_colors: default_dynamic_colors(),
        }
    }

    /// Loads, validates, and applies the log level.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: StoreConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.validate()?;
        config.apply_logging()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("file", &config.file_path().display().to_string()),
                ("on_load_failure", &config.on_load_failure.to_string()),
            ],
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("data_dir must not be empty"));
        }

        if self.file_name.is_empty() {
            return Err(ConfigError::invalid("file_name must not be empty"));
        }
        if self.file_name == "." || self.file_name == ".." || self.file_name.contains(['/', '\\'])
        {
            return Err(ConfigError::invalid(format!(
                "file_name '{}' must be a plain file name",
                self.file_name
            )));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::from_label(&self.log_level).ok_or_else(|| {
            ConfigError::invalid(format!("unknown log_level '{}'", self.log_level))
        })
    }

    /// Sets the process-wide log threshold from `log_level`.
    pub fn apply_logging(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }

    /// Full path of the preference file
    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("prefdb.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_apply() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, r#"{"data_dir": "/tmp/prefs"}"#);
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config, StoreConfig::new("/tmp/prefs"));
        assert_eq!(config.file_path(), Path::new("/tmp/prefs/prefdb-app-prefs.json"));
    }

    #[test]
    fn test_policy_parses() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"{"data_dir": "d", "on_load_failure": "defaults", "dynamic_colors": false}"#,
        );
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.on_load_failure, LoadFailurePolicy::Defaults);
        assert!(!config.dynamic_colors);
    }

    #[test]
    fn test_missing_data_dir_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, r#"{"file_name": "x.json"}"#);
        assert_eq!(StoreConfig::load(&path).unwrap_err().code(), "PREF_CONFIG_PARSE");
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, r#"{"data_dir": "d", "on_load_failure": "ignore"}"#);
        assert!(matches!(
            StoreConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = StoreConfig::new("d");
        assert!(config.validate().is_ok());

        config.file_name = "../escape.json".into();
        assert_eq!(config.validate().unwrap_err().code(), "PREF_CONFIG_INVALID");

        config.file_name = DEFAULT_FILE_NAME.into();
        config.log_level = "loud".into();
        assert!(config.validate().is_err());

        assert!(StoreConfig::new("").validate().is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = StoreConfig::load(&tmp.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "PREF_CONFIG_READ");
    }
}
