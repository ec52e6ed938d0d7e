//! Core data models for the weather dashboard
//!
//! This module contains the data types shared by the API client, the forecast
//! aggregator and the application state: current conditions, forecast samples,
//! air quality and the per-day summaries derived from the forecast.

pub mod client;
pub mod location;

pub use client::{OpenWeatherClient, WeatherApi, WeatherError};
pub use location::{FixedLocation, Geolocator, IpGeolocator, LocationError, NoLocation};

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unit system forwarded to the upstream service
///
/// Values are never converted locally; the service answers in the requested units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres per second
    #[default]
    Metric,
    /// Fahrenheit, miles per hour
    Imperial,
}

impl Units {
    /// The `units` query parameter value
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Returns the other unit system
    pub fn toggle(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// A point on the globe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions for a named location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Location name as reported by the service
    pub name: String,
    /// ISO country code, empty when the service omits it
    pub country: String,
    /// Temperature in the requested units
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: f64,
    /// Wind speed in the requested units
    pub wind_speed: f64,
    /// Condition group, e.g. "Clouds"
    pub condition: String,
    /// Human-readable description, e.g. "scattered clouds"
    pub description: String,
    /// Rain volume for the last hour in mm, if any fell
    pub rain_1h: Option<f64>,
    /// Where the service located the city
    pub coordinates: Coordinates,
}

/// One 3-hour slot of the forecast feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub temperature: f64,
    /// Condition group of the slot, e.g. "Rain"
    pub condition: String,
}

/// The 5-day/3-hour forecast, ordered by time ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub samples: Vec<ForecastSample>,
}

/// Air quality index reported for a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirQuality {
    /// 1 (good) to 5 (very poor)
    pub aqi: u8,
}

impl AirQuality {
    /// Qualitative level for the index
    pub fn level(&self) -> &'static str {
        match self.aqi {
            1 => "Good",
            2 => "Fair",
            3 => "Moderate",
            4 => "Poor",
            5 => "Very Poor",
            _ => "Unknown",
        }
    }
}

/// Aggregate of all forecast samples sharing a calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Local calendar date of the samples
    pub calendar_date: NaiveDate,
    /// Mean temperature, rounded to 2 decimal places
    pub average_temperature: f64,
    /// Condition of the first sample seen for the date
    pub representative_condition: String,
}
