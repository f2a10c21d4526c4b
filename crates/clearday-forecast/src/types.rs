use serde::{Deserialize, Serialize};

use crate::date::ForecastDate;

/// One day of a pollutant forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantForecast {
    pub date: ForecastDate,
    /// Daily average concentration
    pub avg: f64,
}

impl PollutantForecast {
    pub fn new(date: impl Into<ForecastDate>, avg: f64) -> Self {
        Self {
            date: date.into(),
            avg,
        }
    }
}

/// Multi-day air-quality forecast for one station
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirQualityForecast {
    pub city: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Current station AQI as reported by the provider
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default, alias = "dominentpol")]
    pub dominant_pollutant: Option<String>,
    #[serde(default)]
    pub pm25_forecast: Vec<PollutantForecast>,
    #[serde(default)]
    pub pm10_forecast: Vec<PollutantForecast>,
    #[serde(default)]
    pub o3_forecast: Vec<PollutantForecast>,
    #[serde(default)]
    pub uvi_forecast: Vec<PollutantForecast>,
}

impl AirQualityForecast {
    /// Create an empty forecast for a city
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Self::default()
        }
    }

    /// True when neither particulate series has any entry.
    pub fn is_empty(&self) -> bool {
        self.pm25_forecast.is_empty() && self.pm10_forecast.is_empty()
    }
}

/// Daily weather forecast entry (Open-Meteo daily variables)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub date: ForecastDate,
    #[serde(default)]
    pub weather_code: Option<f64>,
    /// Maximum temperature at 2m, °C
    #[serde(default)]
    pub temperature_2m_max: Option<f64>,
    /// Seconds of sunshine
    #[serde(default)]
    pub sunshine_duration: Option<f64>,
    /// Hours with precipitation
    #[serde(default)]
    pub precipitation_hours: Option<f64>,
}

impl WeatherForecast {
    pub fn new(
        date: impl Into<ForecastDate>,
        temperature_2m_max: f64,
        sunshine_duration: f64,
        precipitation_hours: f64,
    ) -> Self {
        Self {
            date: date.into(),
            weather_code: None,
            temperature_2m_max: Some(temperature_2m_max),
            sunshine_duration: Some(sunshine_duration),
            precipitation_hours: Some(precipitation_hours),
        }
    }
}

/// Forecast payload errors
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Unknown station")]
    UnknownStation,
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ForecastError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnknownStation => "No air-quality station found for this location.",
            Self::InvalidPayload(_) | Self::Parse(_) => {
                "Forecast data has an unexpected format. Please try again later."
            }
            Self::InvalidDate(_) => "Forecast data contains an unreadable date.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_air_quality_forecast_accepts_provider_field_name() {
        let forecast: AirQualityForecast = serde_json::from_value(serde_json::json!({
            "city": "Berlin",
            "dominentpol": "pm25",
            "pm25_forecast": [{"date": "2024-12-20", "avg": 24.0}],
        }))
        .unwrap();

        assert_eq!(forecast.dominant_pollutant.as_deref(), Some("pm25"));
        assert_eq!(forecast.pm25_forecast.len(), 1);
        assert!(forecast.pm10_forecast.is_empty());
        assert!(!forecast.is_empty());
    }

    #[test]
    fn test_empty_forecast() {
        assert!(AirQualityForecast::new("Berlin").is_empty());
    }

    #[test]
    fn test_weather_nulls_are_kept() {
        let day: WeatherForecast = serde_json::from_value(serde_json::json!({
            "date": "2024-12-20T00:00:00+00:00",
            "temperature_2m_max": null,
            "precipitation_hours": 2.0,
        }))
        .unwrap();

        assert_eq!(day.date.date(), NaiveDate::from_ymd_opt(2024, 12, 20).unwrap());
        assert_eq!(day.temperature_2m_max, None);
        assert_eq!(day.sunshine_duration, None);
        assert_eq!(day.precipitation_hours, Some(2.0));
    }

    #[test]
    fn test_error_user_messages() {
        assert!(ForecastError::UnknownStation.user_message().contains("station"));
        assert!(ForecastError::InvalidDate("x".into()).user_message().contains("date"));
    }
}
