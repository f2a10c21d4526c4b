//! AQI health categories.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

const BUNDLED_CATEGORIES: &str = include_str!("data/aqi_categories.json");

/// A named AQI range; `level` 1 is the best air.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiCategory {
    pub name: String,
    pub lower_bound: f64,
    /// `None` for the worst, unbounded category
    pub upper_bound: Option<f64>,
    pub level: u8,
    #[serde(default)]
    pub color: Option<String>,
}

impl AqiCategory {
    pub fn new(
        name: impl Into<String>,
        lower_bound: f64,
        upper_bound: Option<f64>,
        level: u8,
    ) -> Self {
        Self {
            name: name.into(),
            lower_bound,
            upper_bound,
            level,
            color: None,
        }
    }

    pub fn contains(&self, aqi: f64) -> bool {
        match self.upper_bound {
            Some(upper) => self.lower_bound <= aqi && aqi <= upper,
            None => aqi >= self.lower_bound,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    lower_bound: f64,
    upper_bound: Option<f64>,
    level: u8,
    #[serde(default)]
    color: Option<String>,
}

/// Categories ordered by level.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    categories: Vec<AqiCategory>,
}

impl CategoryTable {
    pub fn new(mut categories: Vec<AqiCategory>) -> Result<Self, AnalysisError> {
        if categories.is_empty() {
            return Err(AnalysisError::configuration("category table is empty"));
        }

        categories.sort_by_key(|c| c.level);

        for pair in categories.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            if lower.level == higher.level {
                return Err(AnalysisError::configuration(format!(
                    "categories {:?} and {:?} share level {}",
                    lower.name, higher.name, lower.level
                )));
            }
            let Some(upper) = lower.upper_bound else {
                return Err(AnalysisError::configuration(format!(
                    "only the worst category may be unbounded, but {:?} is",
                    lower.name
                )));
            };
            if upper >= higher.lower_bound || higher.lower_bound <= lower.lower_bound {
                return Err(AnalysisError::configuration(format!(
                    "categories {:?} and {:?} overlap or are out of order",
                    lower.name, higher.name
                )));
            }
        }

        Ok(Self { categories })
    }

    /// Parse the JSON reference format:
    ///
    /// ```json
    /// {"Good": {"lower_bound": 0, "upper_bound": 50, "color": "green", "level": 1}, ...}
    /// ```
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let raw: BTreeMap<String, RawCategory> = serde_json::from_str(json)
            .map_err(|e| AnalysisError::configuration(format!("invalid category data: {}", e)))?;

        let categories = raw
            .into_iter()
            .map(|(name, c)| AqiCategory {
                name,
                lower_bound: c.lower_bound,
                upper_bound: c.upper_bound,
                level: c.level,
                color: c.color,
            })
            .collect();

        Self::new(categories)
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::configuration(format!(
                "failed to read categories from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    /// The six US EPA categories, Good through Hazardous.
    pub fn bundled() -> Result<Self, AnalysisError> {
        Self::from_json(BUNDLED_CATEGORIES)
    }

    pub fn categories(&self) -> &[AqiCategory] {
        &self.categories
    }

    pub fn by_level(&self, level: u8) -> Option<&AqiCategory> {
        self.categories.iter().find(|c| c.level == level)
    }

    /// First category, by ascending level, whose range holds `aqi`.
    pub fn categorize(&self, aqi: f64) -> Result<&AqiCategory, AnalysisError> {
        self.categories
            .iter()
            .find(|c| c.contains(aqi))
            .ok_or_else(|| {
                tracing::error!("No AQI category covers {}", aqi);
                AnalysisError::configuration(format!("no AQI category covers {}", aqi))
            })
    }
}
