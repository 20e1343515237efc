//! Configuration file management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sensordb_store::{JournalMode, Mode, OpenOptions, Retention};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

/// Longest busy timeout accepted from the config file.
pub const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
    /// Maximum samples a producer keeps; absent or <= 0 is unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<i64>,
    /// Journal mode a producer sets on the database; absent keeps the
    /// file's current mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_mode: Option<JournalMode>,
    /// Lock wait bound in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: sensordb_store::default_db_path(),
            retention: None,
            journal_mode: None,
            busy_timeout_ms: sensordb_store::DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        if self.busy_timeout_ms == 0 || self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            errors.push(ValidationError {
                field: "storage.busy_timeout_ms".to_string(),
                message: format!(
                    "busy timeout {} is out of range (1..={} ms)",
                    self.busy_timeout_ms, MAX_BUSY_TIMEOUT_MS
                ),
            });
        }

        errors
    }

    /// Open options for `mode`, with `retention` overriding the configured
    /// limit when given.
    pub fn open_options(&self, mode: Mode, retention: Option<i64>) -> OpenOptions {
        let limit = retention.or(self.retention).unwrap_or(0);
        let options = OpenOptions::new(mode)
            .retention(Retention::from(limit))
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms));
        match self.journal_mode {
            Some(journal_mode) => options.journal_mode(journal_mode),
            None => options,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: "text", "json" or "csv".
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

impl OutputConfig {
    /// Validate output configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        if OutputFormat::from_name(&self.format).is_some() {
            Vec::new()
        } else {
            vec![ValidationError {
                field: "output.format".to_string(),
                message: format!(
                    "unknown format '{}': expected text, json or csv",
                    self.format
                ),
            }]
        }
    }

    /// Resolve format: explicit flag overrides config.
    pub fn resolve_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or_else(|| OutputFormat::from_name(&self.format))
            .unwrap_or_default()
    }
}

impl Config {
    /// Load configuration from the default path, or defaults if absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.storage.validate();
        errors.extend(self.output.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from `path` (or the default location) and validate.
    pub fn load_validated(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Database path: explicit flag overrides config.
    pub fn resolve_db_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .unwrap_or_else(|| self.storage.path.clone())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `storage.path`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sensordb")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.storage.path, sensordb_store::default_db_path());
        assert_eq!(config.storage.retention, None);
        assert_eq!(config.storage.journal_mode, None);
        assert_eq!(config.output.format, "text");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [storage]
            path = "/data/sensors.db"
            retention = 1440
            journal_mode = "wal"
            busy_timeout_ms = 250

            [output]
            format = "csv"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/data/sensors.db"));
        assert_eq!(config.storage.retention, Some(1440));
        assert_eq!(config.storage.journal_mode, Some(JournalMode::Wal));
        assert_eq!(config.storage.busy_timeout_ms, 250);
        assert_eq!(config.output.resolve_format(None), OutputFormat::Csv);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[storage]\nretention = 10\n").unwrap();
        assert_eq!(config.storage.path, sensordb_store::default_db_path());
        assert_eq!(config.output.format, "text");
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            storage: StorageConfig {
                path: PathBuf::from("/tmp/test.db"),
                retention: Some(50),
                ..Default::default()
            },
            output: OutputConfig {
                format: "json".to_string(),
            },
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = Config {
            storage: StorageConfig {
                path: PathBuf::new(),
                busy_timeout_ms: 0,
                ..Default::default()
            },
            output: OutputConfig {
                format: "xml".to_string(),
            },
        };

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec!["storage.path", "storage.busy_timeout_ms", "output.format"]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigError::Validation(vec![ValidationError {
            field: "storage.path".to_string(),
            message: "database path cannot be empty".to_string(),
        }]);
        assert_eq!(
            error.to_string(),
            "Configuration validation failed:\n  - storage.path: database path cannot be empty"
        );
    }

    #[test]
    fn test_open_options_resolution() {
        let storage = StorageConfig {
            retention: Some(100),
            journal_mode: Some(JournalMode::Wal),
            busy_timeout_ms: 1500,
            ..Default::default()
        };

        let from_config = storage.open_options(Mode::Producer, None);
        assert_eq!(from_config.retention.limit(), Some(100));
        assert_eq!(from_config.journal_mode, Some(JournalMode::Wal));
        assert_eq!(from_config.busy_timeout, Duration::from_millis(1500));

        let overridden = storage.open_options(Mode::Producer, Some(0));
        assert_eq!(overridden.retention, Retention::Unbounded);

        let untouched = StorageConfig::default().open_options(Mode::Producer, None);
        assert_eq!(untouched.journal_mode, None);
    }

    #[test]
    fn test_resolve_db_path_prefers_flag() {
        let config = Config::default();
        let flag = PathBuf::from("/flag/sensors.db");
        assert_eq!(config.resolve_db_path(Some(&flag)), flag);
        assert_eq!(config.resolve_db_path(None), config.storage.path);
    }

    #[test]
    fn test_resolve_format_prefers_flag() {
        let output = OutputConfig {
            format: "json".to_string(),
        };
        assert_eq!(output.resolve_format(Some(OutputFormat::Csv)), OutputFormat::Csv);
        assert_eq!(output.resolve_format(None), OutputFormat::Json);
    }

    #[test]
    fn test_default_config_path() {
        assert!(default_config_path().ends_with("sensordb/config.toml"));
    }
}
