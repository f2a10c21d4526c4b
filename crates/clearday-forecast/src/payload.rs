//! Adapters from provider payloads to forecast records.
//!
//! AQICN (https://aqicn.org/json-api/doc/) returns a feed with per-pollutant
//! daily forecasts. Open-Meteo returns daily variables as parallel column
//! arrays. Neither adapter touches the network; callers hand in the decoded
//! JSON body.

use serde::Deserialize;
use serde_json::Value;

use crate::date::ForecastDate;
use crate::types::{AirQualityForecast, ForecastError, PollutantForecast, WeatherForecast};

const UNKNOWN_STATION: &str = "Unknown station";

const FEED_KEYS: &[&str] = &["aqi", "city", "dominentpol", "time", "forecast"];
const CITY_KEYS: &[&str] = &["geo", "name"];
const DAILY_KEYS: &[&str] = &["o3", "pm25", "pm10", "uvi"];

#[derive(Debug, Deserialize)]
struct AqicnFeed {
    aqi: Value,
    city: AqicnCity,
    dominentpol: Option<String>,
    forecast: AqicnForecast,
}

#[derive(Debug, Deserialize)]
struct AqicnCity {
    geo: Vec<f64>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AqicnForecast {
    daily: AqicnDaily,
}

#[derive(Debug, Deserialize)]
struct AqicnDaily {
    pm25: Vec<AqicnDay>,
    pm10: Vec<AqicnDay>,
    o3: Vec<AqicnDay>,
    uvi: Vec<AqicnDay>,
}

#[derive(Debug, Deserialize)]
struct AqicnDay {
    avg: f64,
    day: ForecastDate,
}

impl From<AqicnDay> for PollutantForecast {
    fn from(day: AqicnDay) -> Self {
        PollutantForecast {
            date: day.day,
            avg: day.avg,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<ForecastDate>,
    #[serde(default)]
    weather_code: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    sunshine_duration: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_hours: Vec<Option<f64>>,
}

fn missing_keys(value: &Value, keys: &[&str], scope: &str) -> Result<(), ForecastError> {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| value.get(key).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ForecastError::InvalidPayload(format!(
            "{} is missing: {}",
            scope,
            missing.join(", ")
        )))
    }
}

/// Convert an AQICN feed into an [`AirQualityForecast`].
///
/// Accepts either the full `{status, data}` envelope or just its `data`
/// object. `city` overrides the station name, which AQICN reports in local
/// script.
pub fn parse_aqicn_feed(
    payload: &Value,
    city: Option<&str>,
) -> Result<AirQualityForecast, ForecastError> {
    let data = payload.get("data").unwrap_or(payload);

    if let Some(message) = data.as_str() {
        if message == UNKNOWN_STATION {
            tracing::info!("AQICN has no station for {:?}", city);
            return Err(ForecastError::UnknownStation);
        }
        return Err(ForecastError::InvalidPayload(format!(
            "AQICN returned: {}",
            message
        )));
    }

    if !data.is_object() {
        return Err(ForecastError::InvalidPayload(
            "expected the feed to be an object".to_string(),
        ));
    }

    missing_keys(data, FEED_KEYS, "feed")?;
    missing_keys(&data["city"], CITY_KEYS, "feed.city")?;
    let daily = data
        .get("forecast")
        .and_then(|f| f.get("daily"))
        .ok_or_else(|| ForecastError::InvalidPayload("feed.forecast.daily is missing".into()))?;
    missing_keys(daily, DAILY_KEYS, "feed.forecast.daily")?;

    let feed: AqicnFeed = serde_json::from_value(data.clone())?;

    let (latitude, longitude) = match feed.city.geo.as_slice() {
        [lat, lon, ..] => (Some(*lat), Some(*lon)),
        _ => (None, None),
    };

    let forecast = AirQualityForecast {
        city: city
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or(feed.city.name),
        latitude,
        longitude,
        // AQICN reports "-" when the station has no current reading
        aqi: feed.aqi.as_f64(),
        dominant_pollutant: feed.dominentpol,
        pm25_forecast: feed.forecast.daily.pm25.into_iter().map(Into::into).collect(),
        pm10_forecast: feed.forecast.daily.pm10.into_iter().map(Into::into).collect(),
        o3_forecast: feed.forecast.daily.o3.into_iter().map(Into::into).collect(),
        uvi_forecast: feed.forecast.daily.uvi.into_iter().map(Into::into).collect(),
    };

    tracing::debug!(
        "Parsed AQICN feed for {}: {} PM2.5 days, {} PM10 days",
        forecast.city,
        forecast.pm25_forecast.len(),
        forecast.pm10_forecast.len()
    );

    Ok(forecast)
}

fn column<'a>(
    name: &str,
    values: &'a [Option<f64>],
    len: usize,
) -> Result<Option<&'a [Option<f64>]>, ForecastError> {
    if values.is_empty() {
        Ok(None)
    } else if values.len() != len {
        Err(ForecastError::InvalidPayload(format!(
            "daily.{} has {} values for {} days",
            name,
            values.len(),
            len
        )))
    } else {
        Ok(Some(values))
    }
}

/// Convert an Open-Meteo daily forecast response into weather records.
///
/// Columns that were not requested come back absent and are left as `None`.
pub fn parse_open_meteo_daily(payload: &Value) -> Result<Vec<WeatherForecast>, ForecastError> {
    if payload.get("daily").is_none() {
        return Err(ForecastError::InvalidPayload(
            "response has no daily section".to_string(),
        ));
    }

    let response: OpenMeteoResponse = serde_json::from_value(payload.clone())?;
    let daily = response.daily;
    let len = daily.time.len();

    let weather_code = column("weather_code", &daily.weather_code, len)?;
    let temperature = column("temperature_2m_max", &daily.temperature_2m_max, len)?;
    let sunshine = column("sunshine_duration", &daily.sunshine_duration, len)?;
    let precipitation = column("precipitation_hours", &daily.precipitation_hours, len)?;

    let at = |col: Option<&[Option<f64>]>, i: usize| col.and_then(|c| c[i]);

    let days = daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| WeatherForecast {
            date: *date,
            weather_code: at(weather_code, i),
            temperature_2m_max: at(temperature, i),
            sunshine_duration: at(sunshine, i),
            precipitation_hours: at(precipitation, i),
        })
        .collect::<Vec<_>>();

    tracing::debug!("Parsed {} Open-Meteo forecast days", days.len());
    Ok(days)
}
