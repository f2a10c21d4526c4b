use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::error::ConfigError;

const ENV_PREFIX: &str = "CLEARDAY";
const ENV_SEPARATOR: &str = "__";

const MIN_CATEGORY_LEVEL: u8 = 1;
const MAX_CATEGORY_LEVEL: u8 = 6;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reference tables and ranking behavior
    pub analysis: AnalysisConfig,

    /// Log output
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pollutant breakpoint JSON; the bundled EPA tables are used when unset
    pub breakpoints_path: Option<PathBuf>,

    /// AQI category JSON; the bundled EPA categories are used when unset
    pub categories_path: Option<PathBuf>,

    /// Return no recommendation when every remaining day is at or above this
    /// category level. Off by default.
    pub suppress_from_level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from the user config directory, writing defaults on first run
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::load_from(&config_path)?;
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Could not write default config: {}", e);
            }
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) layered under `CLEARDAY__*` environment variables
    ///
    /// `CLEARDAY__ANALYSIS__SUPPRESS_FROM_LEVEL=4` sets `analysis.suppress_from_level`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_file(
            self.analysis.breakpoints_path.as_deref(),
            "analysis.breakpoints_path",
            &mut result,
        );
        Self::validate_file(
            self.analysis.categories_path.as_deref(),
            "analysis.categories_path",
            &mut result,
        );

        match self.analysis.suppress_from_level {
            Some(level) if !(MIN_CATEGORY_LEVEL..=MAX_CATEGORY_LEVEL).contains(&level) => result
                .add_error(
                    "analysis.suppress_from_level",
                    format!(
                        "Category level must be between {} and {}, got {}",
                        MIN_CATEGORY_LEVEL, MAX_CATEGORY_LEVEL, level
                    ),
                ),
            Some(level) => result.add_warning(
                "analysis.suppress_from_level",
                format!(
                    "No recommendation is returned when every day is category {} or worse",
                    level
                ),
            ),
            None => {}
        }

        if LevelFilter::from_str(&self.logging.level).is_err() {
            result.add_error(
                "logging.level",
                format!("Unknown log level: {}", self.logging.level),
            );
        }

        result
    }

    fn validate_file(path: Option<&Path>, field_name: &str, result: &mut ValidationResult) {
        let Some(path) = path else {
            return;
        };

        if !path.exists() {
            result.add_error(
                field_name,
                format!("File does not exist: {}", path.display()),
            );
        } else if !path.is_file() {
            result.add_error(field_name, format!("Not a file: {}", path.display()));
        }
    }

    /// Save configuration to `path` as TOML
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Write(format!("{}: {}", parent.display(), e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Write(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Path of the user config file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("user config directory".to_string()))?
            .join("clearday");

        Ok(config_dir.join("config.toml"))
    }
}
