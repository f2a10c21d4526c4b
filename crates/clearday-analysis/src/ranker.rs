//! Ranking of upcoming days for outdoor sports.
//!
//! Days are ordered by AQI category first, then by weather: fewest
//! precipitation hours, highest maximum temperature, most sunshine. Missing
//! weather values sort after present ones for every key.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clearday_forecast::{AirQualityForecast, WeatherForecast};
use serde::{Deserialize, Serialize};

use crate::calculator::{AqiCalculator, DailyAqi, DailyPollutantReading};
use crate::category::CategoryTable;
use crate::error::AnalysisError;

/// A day's AQI with its category level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorizedDay {
    pub date: NaiveDate,
    pub aqi: f64,
    pub category: u8,
}

/// One entry of the recommendation list.
///
/// Weather fields are `null` in JSON when the weather forecast has no entry
/// for the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub aqi: f64,
    pub category: u8,
    pub temperature_2m_max: Option<f64>,
    pub sunshine_duration: Option<f64>,
    pub precipitation_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// When set, return no days at all if every eligible day has a category
    /// level at or above this one.
    pub suppress_from_level: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy)]
struct JoinedDay {
    date: NaiveDate,
    aqi: f64,
    category: u8,
    temperature_2m_max: Option<f64>,
    sunshine_duration: Option<f64>,
    precipitation_hours: Option<f64>,
}

impl From<JoinedDay> for RankedDay {
    fn from(day: JoinedDay) -> Self {
        RankedDay {
            date: day.date.format("%Y-%m-%d").to_string(),
            aqi: day.aqi,
            category: day.category,
            temperature_2m_max: day.temperature_2m_max,
            sunshine_duration: day.sunshine_duration,
            precipitation_hours: day.precipitation_hours,
        }
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn compare_nulls_last(a: Option<f64>, b: Option<f64>, direction: Direction) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            Direction::Ascending => a.total_cmp(&b),
            Direction::Descending => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Cleanest air, then driest, then warmest, then sunniest.
fn compare_days(a: &JoinedDay, b: &JoinedDay) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| {
            compare_nulls_last(a.precipitation_hours, b.precipitation_hours, Direction::Ascending)
        })
        .then_with(|| {
            compare_nulls_last(a.temperature_2m_max, b.temperature_2m_max, Direction::Descending)
        })
        .then_with(|| {
            compare_nulls_last(a.sunshine_duration, b.sunshine_duration, Direction::Descending)
        })
}

/// Group the particulate series by calendar date.
///
/// A later entry for the same date replaces an earlier one. Readings come
/// back in date order rather than in the order the series listed them, so
/// days with equal AQI reach the ranking sorted by date.
pub fn daily_readings(air_quality: &AirQualityForecast) -> Vec<DailyPollutantReading> {
    let mut by_date: BTreeMap<NaiveDate, DailyPollutantReading> = BTreeMap::new();

    for forecast in &air_quality.pm25_forecast {
        let date = forecast.date.date();
        by_date
            .entry(date)
            .or_insert_with(|| DailyPollutantReading {
                date,
                pm25: None,
                pm10: None,
            })
            .pm25 = Some(forecast.avg);
    }

    for forecast in &air_quality.pm10_forecast {
        let date = forecast.date.date();
        by_date
            .entry(date)
            .or_insert_with(|| DailyPollutantReading {
                date,
                pm25: None,
                pm10: None,
            })
            .pm10 = Some(forecast.avg);
    }

    by_date.into_values().collect()
}

#[derive(Debug, Clone)]
pub struct ForecastRanker {
    calculator: AqiCalculator,
    categories: Arc<CategoryTable>,
    options: RankingOptions,
}

impl ForecastRanker {
    pub fn new(calculator: AqiCalculator, categories: Arc<CategoryTable>) -> Self {
        Self {
            calculator,
            categories,
            options: RankingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RankingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn calculator(&self) -> &AqiCalculator {
        &self.calculator
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Composite AQI for every date in the air-quality forecast, by date.
    pub fn daily_aqi(
        &self,
        air_quality: &AirQualityForecast,
    ) -> Result<Vec<DailyAqi>, AnalysisError> {
        daily_readings(air_quality)
            .iter()
            .map(|reading| self.calculator.calculate_daily(reading))
            .collect()
    }

    /// Attach a category level to each day, ordered by ascending AQI.
    ///
    /// Days with equal AQI keep their input order.
    pub fn categorize(&self, daily: &[DailyAqi]) -> Result<Vec<CategorizedDay>, AnalysisError> {
        let mut categorized = daily
            .iter()
            .map(|day| -> Result<CategorizedDay, AnalysisError> {
                let category = self.categories.categorize(day.aqi)?;
                Ok(CategorizedDay {
                    date: day.date,
                    aqi: day.aqi,
                    category: category.level,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        categorized.sort_by(|a, b| a.aqi.total_cmp(&b.aqi));
        Ok(categorized)
    }

    /// Rank the days from `today` onwards, best first.
    ///
    /// Returns an empty list when no forecast day falls on or after `today`.
    pub fn predict_best_outdoor_sports_day(
        &self,
        air_quality: &AirQualityForecast,
        weather: &[WeatherForecast],
        today: NaiveDate,
    ) -> Result<Vec<RankedDay>, AnalysisError> {
        let daily = self.daily_aqi(air_quality)?;
        let categorized = self.categorize(&daily)?;

        let mut weather_by_date: HashMap<NaiveDate, &WeatherForecast> = HashMap::new();
        for day in weather {
            let date = day.date.date();
            if weather_by_date.contains_key(&date) {
                tracing::warn!("Duplicate weather forecast for {}, keeping the first", date);
                continue;
            }
            weather_by_date.insert(date, day);
        }

        let mut joined: Vec<JoinedDay> = categorized
            .iter()
            .filter(|day| day.date >= today)
            .map(|day| {
                let weather = weather_by_date.get(&day.date);
                if weather.is_none() {
                    tracing::debug!("No weather forecast for {}", day.date);
                }
                JoinedDay {
                    date: day.date,
                    aqi: day.aqi,
                    category: day.category,
                    temperature_2m_max: weather.and_then(|w| present(w.temperature_2m_max)),
                    sunshine_duration: weather.and_then(|w| present(w.sunshine_duration)),
                    precipitation_hours: weather.and_then(|w| present(w.precipitation_hours)),
                }
            })
            .collect();

        if joined.is_empty() {
            tracing::info!(
                "No usable forecast for {} on or after {}",
                air_quality.city,
                today
            );
            return Ok(Vec::new());
        }

        if let Some(threshold) = self.options.suppress_from_level {
            if joined.iter().all(|day| day.category >= threshold) {
                tracing::info!(
                    "All {} days for {} are category {} or worse, suppressing recommendation",
                    joined.len(),
                    air_quality.city,
                    threshold
                );
                return Ok(Vec::new());
            }
        }

        joined.sort_by(compare_days);

        tracing::debug!(
            "Ranked {} days for {}, best is {}",
            joined.len(),
            air_quality.city,
            joined[0].date
        );

        Ok(joined.into_iter().map(RankedDay::from).collect())
    }

    /// Same as [`predict_best_outdoor_sports_day`](Self::predict_best_outdoor_sports_day)
    /// with `today` taken from the local clock.
    pub fn predict_for_today(
        &self,
        air_quality: &AirQualityForecast,
        weather: &[WeatherForecast],
    ) -> Result<Vec<RankedDay>, AnalysisError> {
        self.predict_best_outdoor_sports_day(air_quality, weather, Local::now().date_naive())
    }
}
