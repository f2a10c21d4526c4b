//! Forecast records for Clearday
//!
//! Air-quality and weather forecast records as the analysis consumes them,
//! plus adapters for the AQICN feed and Open-Meteo daily payloads.

pub mod date;
pub mod payload;
pub mod types;

pub use date::ForecastDate;
pub use payload::{parse_aqicn_feed, parse_open_meteo_daily};
pub use types::*;
