//! Centralized error types for Clearday.
//!
//! Every error the analysis surfaces converts into [`AppError`]. Callers use
//! `user_message()` for the text shown to people and `is_fatal()` to tell a
//! bad request apart from broken reference data.

use clearday_analysis::AnalysisError;
use clearday_forecast::ForecastError;
use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Forecast(e) => e.user_message(),
            AppError::Analysis(AnalysisError::InvalidInput(_)) => {
                "The forecast is missing pollutant data. Try another location."
            }
            AppError::Analysis(AnalysisError::Configuration(_)) => {
                "Air-quality reference data is misconfigured. Please try again later."
            }
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// True for defects in configuration or reference data, which no retry
    /// of the same request will fix.
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Config(_) => true,
            AppError::Analysis(e) => e.is_configuration(),
            _ => false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Failed to write configuration: {0}")]
    Write(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Write(_) => "Could not save configuration. Check file permissions.",
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        match e {
            config::ConfigError::NotFound(key) => ConfigError::NotFound(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Forecast(ForecastError::UnknownStation),
            AppError::Analysis(AnalysisError::invalid_input("test")),
            AppError::Analysis(AnalysisError::configuration("test")),
            AppError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "test")),
            AppError::Other(anyhow::anyhow!("test")),
        ];

        for error in errors {
            assert!(!error.user_message().is_empty());
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_fatal_errors() {
        assert!(AppError::from(AnalysisError::configuration("no pm10 table")).is_fatal());
        assert!(AppError::from(ConfigError::Invalid("x".into())).is_fatal());
        assert!(!AppError::from(AnalysisError::invalid_input("no pollutants")).is_fatal());
        assert!(!AppError::from(ForecastError::UnknownStation).is_fatal());
    }

    #[test]
    fn test_analysis_errors_convert() {
        let err: AppError = AnalysisError::invalid_input("no pollutants provided").into();
        assert!(matches!(err, AppError::Analysis(AnalysisError::InvalidInput(_))));
        assert!(err.to_string().contains("no pollutants provided"));
    }
}
