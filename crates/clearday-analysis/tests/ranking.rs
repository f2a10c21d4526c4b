//! End-to-end ranking tests over the bundled EPA tables.

use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use clearday_analysis::{AqiCalculator, BreakpointTables, CategoryTable, ForecastRanker, RankedDay};
use clearday_forecast::{AirQualityForecast, PollutantForecast, WeatherForecast};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
}

fn ranker() -> ForecastRanker {
    let breakpoints = Arc::new(BreakpointTables::bundled().unwrap());
    let categories = Arc::new(CategoryTable::bundled().unwrap());
    ForecastRanker::new(AqiCalculator::new(breakpoints), categories)
}

/// Five days, 18th to 22nd December.
fn air_quality() -> AirQualityForecast {
    let mut forecast = AirQualityForecast::new("Berlin");
    forecast.pm25_forecast = vec![
        PollutantForecast::new(day(18), 5.0),
        PollutantForecast::new(day(19), 40.0),
        PollutantForecast::new(day(20), 24.0),
        PollutantForecast::new(day(21), 5.0),
        PollutantForecast::new(day(22), 8.0),
    ];
    forecast.pm10_forecast = vec![
        PollutantForecast::new(day(18), 10.0),
        PollutantForecast::new(day(19), 10.0),
        PollutantForecast::new(day(20), 25.0),
        PollutantForecast::new(day(21), 20.0),
        PollutantForecast::new(day(22), 30.0),
    ];
    forecast
}

fn weather() -> Vec<WeatherForecast> {
    vec![
        WeatherForecast::new(day(18), 12.0, 30000.0, 0.0),
        WeatherForecast::new(day(19), 11.0, 20000.0, 1.0),
        WeatherForecast::new(day(20), 10.0, 3600.0, 0.0),
        WeatherForecast::new(day(21), 5.0, 1000.0, 2.0),
        WeatherForecast::new(day(22), 8.0, 2000.0, 0.0),
    ]
}

fn dates(days: &[RankedDay]) -> Vec<&str> {
    days.iter().map(|d| d.date.as_str()).collect()
}

#[test]
fn test_ranks_remaining_days_from_today() {
    let result = ranker()
        .predict_best_outdoor_sports_day(&air_quality(), &weather(), day(20))
        .unwrap();

    // 21st and 22nd are Good; the 22nd is dry. The 20th is Moderate.
    assert_eq!(dates(&result), vec!["2024-12-22", "2024-12-21", "2024-12-20"]);

    assert_eq!(result[2].category, 2);
    assert_relative_eq!(result[2].aqi, 78.76);
    assert_eq!(result[0].category, 1);
    assert_eq!(result[0].temperature_2m_max, Some(8.0));
    assert_eq!(result[0].sunshine_duration, Some(2000.0));
    assert_eq!(result[0].precipitation_hours, Some(0.0));
}

#[test]
fn test_past_days_excluded_today_included() {
    let result = ranker()
        .predict_best_outdoor_sports_day(&air_quality(), &weather(), day(20))
        .unwrap();

    assert!(!dates(&result).contains(&"2024-12-18"));
    assert!(!dates(&result).contains(&"2024-12-19"));
    assert!(dates(&result).contains(&"2024-12-20"));

    let all = ranker()
        .predict_best_outdoor_sports_day(&air_quality(), &weather(), day(18))
        .unwrap();
    assert_eq!(all.len(), 5);
}

#[test]
fn test_missing_weather_keeps_day_with_nulls() {
    let weather: Vec<WeatherForecast> = weather()
        .into_iter()
        .filter(|w| w.date.date() != day(22))
        .collect();

    let result = ranker()
        .predict_best_outdoor_sports_day(&air_quality(), &weather, day(20))
        .unwrap();

    // Both Good; the 22nd has no precipitation value so it sorts after the 21st.
    assert_eq!(dates(&result), vec!["2024-12-21", "2024-12-22", "2024-12-20"]);

    let missing = &result[1];
    assert_eq!(missing.temperature_2m_max, None);
    assert_eq!(missing.sunshine_duration, None);
    assert_eq!(missing.precipitation_hours, None);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json[1]["temperature_2m_max"].is_null());
    assert!(json[1]["sunshine_duration"].is_null());
    assert!(json[1]["precipitation_hours"].is_null());
    assert_eq!(json[1]["date"], "2024-12-22");
}

#[test]
fn test_identical_inputs_give_identical_output() {
    let ranker = ranker();
    let first = ranker
        .predict_best_outdoor_sports_day(&air_quality(), &weather(), day(19))
        .unwrap();
    let second = ranker
        .predict_best_outdoor_sports_day(&air_quality(), &weather(), day(19))
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_full_ties_keep_join_order() {
    let mut aq = AirQualityForecast::new("Berlin");
    aq.pm25_forecast = vec![
        PollutantForecast::new(day(23), 5.0),
        PollutantForecast::new(day(21), 5.0),
        PollutantForecast::new(day(22), 2.0),
    ];
    let weather = vec![
        WeatherForecast::new(day(21), 10.0, 1000.0, 0.0),
        WeatherForecast::new(day(22), 10.0, 1000.0, 0.0),
        WeatherForecast::new(day(23), 10.0, 1000.0, 0.0),
    ];

    let result = ranker()
        .predict_best_outdoor_sports_day(&aq, &weather, day(20))
        .unwrap();

    // Lower AQI first, equal AQI by date
    assert_eq!(dates(&result), vec!["2024-12-22", "2024-12-21", "2024-12-23"]);
}

#[test]
fn test_empty_forecasts_return_empty_list() {
    let ranker = ranker();

    let result = ranker
        .predict_best_outdoor_sports_day(&AirQualityForecast::new("Nowhere"), &[], day(20))
        .unwrap();
    assert!(result.is_empty());

    let result = ranker
        .predict_best_outdoor_sports_day(&air_quality(), &weather(), day(31))
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_single_pollutant_days_are_ranked() {
    let mut aq = AirQualityForecast::new("Berlin");
    aq.pm25_forecast = vec![PollutantForecast::new(day(20), 24.0)];
    aq.pm10_forecast = vec![PollutantForecast::new(day(21), 25.0)];

    let result = ranker()
        .predict_best_outdoor_sports_day(&aq, &[], day(20))
        .unwrap();

    assert_eq!(dates(&result), vec!["2024-12-21", "2024-12-20"]);
    assert_relative_eq!(result[0].aqi, 23.15);
}

#[test]
fn test_weather_timestamps_join_on_date() {
    let weather: Vec<WeatherForecast> = serde_json::from_value(serde_json::json!([
        {
            "date": "2024-12-21T00:00:00Z",
            "temperature_2m_max": 5.0,
            "sunshine_duration": 1000.0,
            "precipitation_hours": 2.0
        },
        {
            "date": 1734825600,
            "temperature_2m_max": 8.0,
            "sunshine_duration": 2000.0,
            "precipitation_hours": 0.0
        }
    ]))
    .unwrap();

    let result = ranker()
        .predict_best_outdoor_sports_day(&air_quality(), &weather, day(21))
        .unwrap();

    assert_eq!(dates(&result), vec!["2024-12-22", "2024-12-21"]);
    assert_eq!(result[0].temperature_2m_max, Some(8.0));
    assert_eq!(result[1].precipitation_hours, Some(2.0));
}

#[test]
fn test_pm25_tie_below_ceiling_keeps_very_unhealthy() {
    let mut aq = AirQualityForecast::new("Delhi");
    aq.pm25_forecast = vec![
        PollutantForecast::new(day(20), 225.45),
        PollutantForecast::new(day(21), 230.0),
    ];
    let weather = vec![
        WeatherForecast::new(day(20), 20.0, 0.0, 10.0),
        WeatherForecast::new(day(21), 25.0, 40000.0, 0.0),
    ];

    let result = ranker()
        .predict_best_outdoor_sports_day(&aq, &weather, day(20))
        .unwrap();

    assert_eq!(dates(&result), vec!["2024-12-20", "2024-12-21"]);
    assert_relative_eq!(result[0].aqi, 300.0);
    assert_eq!(result[0].category, 5);
    assert_relative_eq!(result[1].aqi, 301.0);
    assert_eq!(result[1].category, 6);
}
