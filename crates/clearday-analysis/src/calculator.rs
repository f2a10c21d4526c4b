//! Composite AQI from particulate concentrations.
//!
//! Follows the US EPA technical assistance document for daily AQI reporting:
//! each pollutant gets a sub-index by linear interpolation inside its
//! breakpoint band, and the day's AQI is the worst sub-index.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::breakpoints::{round_to, BreakpointTables, Pollutant, CEILING_AQI};
use crate::error::AnalysisError;

/// Particulate concentrations forecast for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPollutantReading {
    pub date: NaiveDate,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

/// Composite AQI for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAqi {
    pub date: NaiveDate,
    pub aqi: f64,
}

#[derive(Debug, Clone)]
pub struct AqiCalculator {
    breakpoints: Arc<BreakpointTables>,
}

impl AqiCalculator {
    pub fn new(breakpoints: Arc<BreakpointTables>) -> Self {
        Self { breakpoints }
    }

    pub fn breakpoints(&self) -> &BreakpointTables {
        &self.breakpoints
    }

    /// Composite AQI for whichever pollutants are supplied.
    ///
    /// Concentrations are normalized first (PM2.5 to one decimal, PM10
    /// truncated). Fails with `InvalidInput` when neither pollutant is given
    /// or a value is negative or not a number.
    pub fn calculate_aqi(
        &self,
        pm25: Option<f64>,
        pm10: Option<f64>,
    ) -> Result<f64, AnalysisError> {
        let readings: Vec<(Pollutant, f64)> = [(Pollutant::Pm25, pm25), (Pollutant::Pm10, pm10)]
            .into_iter()
            .filter_map(|(pollutant, value)| value.map(|v| (pollutant, v)))
            .collect();

        if readings.is_empty() {
            return Err(AnalysisError::invalid_input(
                "no pollutants provided; at least one of PM2.5 or PM10 is required",
            ));
        }

        let mut aqi: f64 = 0.0;
        for (pollutant, concentration) in readings {
            if !concentration.is_finite() || concentration < 0.0 {
                return Err(AnalysisError::invalid_input(format!(
                    "{} concentration must be a non-negative number, got {}",
                    pollutant, concentration
                )));
            }

            let sub_index =
                self.pollutant_sub_index(pollutant, pollutant.normalize(concentration))?;
            aqi = aqi.max(sub_index);
        }

        Ok(aqi)
    }

    pub fn calculate_daily(
        &self,
        reading: &DailyPollutantReading,
    ) -> Result<DailyAqi, AnalysisError> {
        let aqi = self.calculate_aqi(reading.pm25, reading.pm10)?;
        Ok(DailyAqi {
            date: reading.date,
            aqi,
        })
    }

    /// AQI sub-index of one pollutant at an already-normalized concentration.
    ///
    /// At or above the open-ended top band [`CEILING_AQI`] is returned as is,
    /// whatever AQI bounds the table lists for that band. Otherwise the first bounded band holding
    /// the concentration is interpolated and the result rounded to 2 decimals.
    pub fn pollutant_sub_index(
        &self,
        pollutant: Pollutant,
        concentration: f64,
    ) -> Result<f64, AnalysisError> {
        let table = self.breakpoints.get(pollutant).ok_or_else(|| {
            tracing::error!("No breakpoints configured for {}", pollutant);
            AnalysisError::configuration(format!(
                "no breakpoints found for pollutant {}",
                pollutant
            ))
        })?;

        if let Some(top) = table.open_band() {
            if concentration >= top.concentration_low {
                return Ok(CEILING_AQI);
            }
        }

        let band = table.find_bounded(concentration).ok_or_else(|| {
            AnalysisError::configuration(format!(
                "no {} breakpoint band covers concentration {}",
                pollutant, concentration
            ))
        })?;

        // Both are present on bounded bands; BreakpointTable::new checks it.
        let (Some(bp_high), Some(aqi_high)) = (band.concentration_high, band.aqi_high) else {
            return Err(AnalysisError::configuration(format!(
                "{} band starting at {} is missing an upper bound",
                pollutant, band.concentration_low
            )));
        };

        let sub_index = ((aqi_high - band.aqi_low) / (bp_high - band.concentration_low))
            * (concentration - band.concentration_low)
            + band.aqi_low;

        Ok(round_to(sub_index, 2))
    }
}
