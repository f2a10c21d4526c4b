//! Air-quality analysis for Clearday
//!
//! Turns pollutant forecasts into US EPA AQI values and ranks upcoming days
//! for outdoor sports by combining them with the weather forecast.

pub mod breakpoints;
pub mod calculator;
pub mod category;
pub mod error;
pub mod ranker;

pub use breakpoints::{BreakpointBand, BreakpointTable, BreakpointTables, Pollutant, CEILING_AQI};
pub use calculator::{AqiCalculator, DailyAqi, DailyPollutantReading};
pub use category::{AqiCategory, CategoryTable};
pub use error::AnalysisError;
pub use ranker::{CategorizedDay, ForecastRanker, RankedDay, RankingOptions};
