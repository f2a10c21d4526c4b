//! Analysis error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The caller supplied data the analysis cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Breakpoint or category reference data is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AnalysisError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error points at a defect in reference data rather than the request.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AnalysisError::invalid_input("no pollutants provided");
        assert_eq!(err.to_string(), "Invalid input: no pollutants provided");

        let err = AnalysisError::configuration("no breakpoints for pm10");
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(AnalysisError::configuration("x").is_configuration());
        assert!(!AnalysisError::invalid_input("x").is_configuration());
    }
}
