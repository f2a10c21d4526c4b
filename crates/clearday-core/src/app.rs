use std::sync::Arc;

use chrono::NaiveDate;
use clearday_analysis::{
    AqiCalculator, BreakpointTables, CategoryTable, ForecastRanker, RankedDay, RankingOptions,
};
use clearday_forecast::{AirQualityForecast, WeatherForecast};

use crate::config::Config;
use crate::error::{AppError, ConfigError};

/// Application state: configuration plus reference tables loaded once.
///
/// Cheap to share across threads; every request works on its own forecasts.
#[derive(Debug, Clone)]
pub struct App {
    config: Arc<Config>,
    ranker: ForecastRanker,
}

impl App {
    /// Create an application from the user config file
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(Config::load()?)
    }

    /// Validate `config` and load the reference tables it points at
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        let breakpoints = match &config.analysis.breakpoints_path {
            Some(path) => {
                tracing::info!("Loading breakpoint tables from {}", path.display());
                BreakpointTables::from_path(path)?
            }
            None => BreakpointTables::bundled()?,
        };

        let categories = match &config.analysis.categories_path {
            Some(path) => {
                tracing::info!("Loading AQI categories from {}", path.display());
                CategoryTable::from_path(path)?
            }
            None => CategoryTable::bundled()?,
        };

        tracing::info!(
            "Loaded breakpoints for {} pollutants and {} AQI categories",
            breakpoints.pollutants().count(),
            categories.categories().len()
        );

        let calculator = AqiCalculator::new(Arc::new(breakpoints));
        let ranker = ForecastRanker::new(calculator, Arc::new(categories)).with_options(
            RankingOptions {
                suppress_from_level: config.analysis.suppress_from_level,
            },
        );

        Ok(Self {
            config: Arc::new(config),
            ranker,
        })
    }

    /// Rank forecast days from `today` onwards for outdoor sports
    ///
    /// An empty list means no usable forecast; errors are never turned into
    /// a default ranking.
    pub fn recommend(
        &self,
        air_quality: &AirQualityForecast,
        weather: &[WeatherForecast],
        today: NaiveDate,
    ) -> Result<Vec<RankedDay>, AppError> {
        tracing::info!(
            "Ranking {} air-quality days and {} weather days for {} from {}",
            air_quality.pm25_forecast.len().max(air_quality.pm10_forecast.len()),
            weather.len(),
            air_quality.city,
            today
        );

        self.ranker
            .predict_best_outdoor_sports_day(air_quality, weather, today)
            .map_err(|e| {
                if e.is_configuration() {
                    tracing::error!(
                        "Reference data defect while ranking {}: {}",
                        air_quality.city,
                        e
                    );
                } else {
                    tracing::warn!("Cannot rank forecast for {}: {}", air_quality.city, e);
                }
                AppError::from(e)
            })
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ranker(&self) -> &ForecastRanker {
        &self.ranker
    }
}
