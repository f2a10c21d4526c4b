//! Pollutant breakpoint tables (US EPA methodology).
//!
//! Each pollutant maps concentration bands onto AQI bands. The last band may
//! be open-ended; anything at or above its lower bound is reported as
//! [`CEILING_AQI`] without interpolation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

const BUNDLED_BREAKPOINTS: &str = include_str!("data/pollutant_breakpoints.json");

/// Sub-index reported for any concentration in an open-ended top band.
pub const CEILING_AQI: f64 = 301.0;

/// Pollutants that feed the composite AQI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
}

impl Pollutant {
    pub const ALL: [Pollutant; 2] = [Pollutant::Pm25, Pollutant::Pm10];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
        }
    }

    /// Resolve a table key such as `pm25_breakpoints` or `pm10`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        let key = key.strip_suffix("_breakpoints").unwrap_or(&key);
        match key {
            "pm25" | "pm2.5" | "pm2_5" => Some(Self::Pm25),
            "pm10" => Some(Self::Pm10),
            _ => None,
        }
    }

    /// Apply the reporting precision the tables are written for.
    ///
    /// PM2.5 is rounded to one decimal, PM10 is truncated to a whole number.
    pub fn normalize(&self, concentration: f64) -> f64 {
        match self {
            Self::Pm25 => round_to(concentration, 1),
            Self::Pm10 => concentration.trunc(),
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pm25 => write!(f, "PM2.5"),
            Self::Pm10 => write!(f, "PM10"),
        }
    }
}

/// Round to `decimals` places on the exact decimal value, ties to even.
///
/// Scaling by a power of ten first would round 0.15 (stored as
/// 0.1499999...) up to 0.2, and 12.25 away from even.
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// One concentration band and the AQI band it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointBand {
    pub concentration_low: f64,
    /// `None` for the open-ended top band
    pub concentration_high: Option<f64>,
    pub aqi_low: f64,
    pub aqi_high: Option<f64>,
}

impl BreakpointBand {
    pub fn new(concentration: (f64, Option<f64>), aqi: (f64, Option<f64>)) -> Self {
        Self {
            concentration_low: concentration.0,
            concentration_high: concentration.1,
            aqi_low: aqi.0,
            aqi_high: aqi.1,
        }
    }

    /// Convenience constructor for a fully bounded band.
    pub fn bounded(concentration: (f64, f64), aqi: (f64, f64)) -> Self {
        Self::new((concentration.0, Some(concentration.1)), (aqi.0, Some(aqi.1)))
    }

    pub fn is_open_ended(&self) -> bool {
        self.concentration_high.is_none()
    }

    /// Inclusive on both ends.
    pub fn contains(&self, concentration: f64) -> bool {
        match self.concentration_high {
            Some(high) => self.concentration_low <= concentration && concentration <= high,
            None => concentration >= self.concentration_low,
        }
    }
}

/// Ordered, validated bands for one pollutant.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    bands: Vec<BreakpointBand>,
}

impl BreakpointTable {
    /// Sort bands by lower concentration bound and validate them.
    pub fn new(mut bands: Vec<BreakpointBand>) -> Result<Self, AnalysisError> {
        if bands.is_empty() {
            return Err(AnalysisError::configuration("breakpoint table has no bands"));
        }

        for band in &bands {
            if !band.concentration_low.is_finite() || !band.aqi_low.is_finite() {
                return Err(AnalysisError::configuration(format!(
                    "band starting at {} has a non-finite bound",
                    band.concentration_low
                )));
            }
            if let Some(high) = band.concentration_high {
                if high <= band.concentration_low {
                    return Err(AnalysisError::configuration(format!(
                        "band [{}, {}] is empty or inverted",
                        band.concentration_low, high
                    )));
                }
                match band.aqi_high {
                    Some(aqi_high) if aqi_high >= band.aqi_low => {}
                    _ => {
                        return Err(AnalysisError::configuration(format!(
                            "band [{}, {}] needs an AQI upper bound of at least {}",
                            band.concentration_low, high, band.aqi_low
                        )))
                    }
                }
            }
        }

        bands.sort_by(|a, b| a.concentration_low.total_cmp(&b.concentration_low));

        let open_ended = bands.iter().filter(|b| b.is_open_ended()).count();
        if open_ended > 1 {
            return Err(AnalysisError::configuration(
                "breakpoint table has more than one open-ended band",
            ));
        }
        if open_ended == 1 && !bands.last().is_some_and(BreakpointBand::is_open_ended) {
            return Err(AnalysisError::configuration(
                "open-ended band must be the highest band",
            ));
        }

        // Touching bands are allowed; the shared value belongs to the lower band.
        for pair in bands.windows(2) {
            if let Some(high) = pair[0].concentration_high {
                if high > pair[1].concentration_low {
                    return Err(AnalysisError::configuration(format!(
                        "bands starting at {} and {} overlap",
                        pair[0].concentration_low, pair[1].concentration_low
                    )));
                }
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[BreakpointBand] {
        &self.bands
    }

    pub fn open_band(&self) -> Option<&BreakpointBand> {
        self.bands.last().filter(|b| b.is_open_ended())
    }

    /// First bounded band containing the concentration.
    pub fn find_bounded(&self, concentration: f64) -> Option<&BreakpointBand> {
        self.bands
            .iter()
            .filter(|b| !b.is_open_ended())
            .find(|b| b.contains(concentration))
    }
}

#[derive(Debug, Deserialize)]
struct RawBand {
    #[serde(rename = "Range")]
    range: (f64, Option<f64>),
    #[serde(rename = "AQI")]
    aqi: (f64, Option<f64>),
}

/// Breakpoint tables keyed by pollutant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakpointTables {
    tables: BTreeMap<Pollutant, BreakpointTable>,
}

impl BreakpointTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for synthetic tables in tests.
    pub fn with_table(mut self, pollutant: Pollutant, table: BreakpointTable) -> Self {
        self.tables.insert(pollutant, table);
        self
    }

    pub fn insert(&mut self, pollutant: Pollutant, table: BreakpointTable) {
        self.tables.insert(pollutant, table);
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<&BreakpointTable> {
        self.tables.get(&pollutant)
    }

    pub fn pollutants(&self) -> impl Iterator<Item = Pollutant> + '_ {
        self.tables.keys().copied()
    }

    /// Parse tables from the JSON reference format:
    ///
    /// ```json
    /// {"pm25_breakpoints": {"Good": {"Range": [0.0, 9.0], "AQI": [0, 50]}, ...}}
    /// ```
    ///
    /// Keys for pollutants the composite AQI does not use (ozone, UV) are skipped.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let raw: BTreeMap<String, BTreeMap<String, RawBand>> = serde_json::from_str(json)
            .map_err(|e| AnalysisError::configuration(format!("invalid breakpoint data: {}", e)))?;

        let mut tables = Self::new();
        for (key, bands) in raw {
            let Some(pollutant) = Pollutant::from_key(&key) else {
                tracing::debug!("Skipping breakpoints for unused pollutant key {}", key);
                continue;
            };

            let bands = bands
                .into_values()
                .map(|band| BreakpointBand::new(band.range, band.aqi))
                .collect();
            let table = BreakpointTable::new(bands).map_err(|e| {
                AnalysisError::configuration(format!("{} breakpoints: {}", pollutant, e))
            })?;
            tables.insert(pollutant, table);
        }

        Ok(tables)
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::configuration(format!(
                "failed to read breakpoints from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    /// US EPA tables (2024 PM2.5 revision) shipped with the crate.
    pub fn bundled() -> Result<Self, AnalysisError> {
        Self::from_json(BUNDLED_BREAKPOINTS)
    }
}
