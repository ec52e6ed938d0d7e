//! OpenWeatherMap API client
//!
//! This module provides functionality to fetch current conditions, the 5-day/3-hour
//! forecast and air pollution data from the OpenWeatherMap 2.5 API and parse them
//! into our data structures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{AirQuality, Coordinates, CurrentWeather, Forecast, ForecastSample, Units};

/// Base URL for the OpenWeatherMap API
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// A forecast entry lacks a temperature or condition
    #[error("Forecast sample {index} is missing {field}")]
    MalformedSample { index: usize, field: &'static str },
}

/// The four upstream operations the dashboard depends on
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Current conditions by city name
    async fn current_by_city(&self, city: &str, units: Units)
        -> Result<CurrentWeather, WeatherError>;

    /// Current conditions by coordinates
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<CurrentWeather, WeatherError>;

    /// 5-day forecast in 3-hour slots by city name
    async fn forecast(&self, city: &str, units: Units) -> Result<Forecast, WeatherError>;

    /// Air quality index by coordinates
    async fn air_quality(&self, coordinates: Coordinates) -> Result<AirQuality, WeatherError>;
}

/// Client for fetching weather data from the OpenWeatherMap API
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a new client for the public API with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: OPENWEATHER_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a new client whose requests give up after `timeout`
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Point the client at a different API root (no trailing slash)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Issue a GET against `path` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    #[instrument(skip(self), level = "debug")]
    async fn current_by_city(
        &self,
        city: &str,
        units: Units,
    ) -> Result<CurrentWeather, WeatherError> {
        let raw: OwmCurrent = self
            .get_json(
                "weather",
                &[("q", city.to_string()), ("units", units.as_query().to_string())],
            )
            .await?;
        parse_current(raw)
    }

    #[instrument(skip(self), level = "debug")]
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<CurrentWeather, WeatherError> {
        let raw: OwmCurrent = self
            .get_json(
                "weather",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                    ("units", units.as_query().to_string()),
                ],
            )
            .await?;
        parse_current(raw)
    }

    #[instrument(skip(self), level = "debug")]
    async fn forecast(&self, city: &str, units: Units) -> Result<Forecast, WeatherError> {
        let raw: OwmForecast = self
            .get_json(
                "forecast",
                &[("q", city.to_string()), ("units", units.as_query().to_string())],
            )
            .await?;
        let forecast = parse_forecast(raw)?;
        debug!(samples = forecast.samples.len(), "forecast decoded");
        Ok(forecast)
    }

    #[instrument(skip(self), level = "debug")]
    async fn air_quality(&self, coordinates: Coordinates) -> Result<AirQuality, WeatherError> {
        let raw: OwmAirPollution = self
            .get_json(
                "air_pollution",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                ],
            )
            .await?;
        parse_air_quality(raw)
    }
}

/// Build an API error from a non-success response body
///
/// OpenWeatherMap errors look like `{"cod":"404","message":"city not found"}`;
/// anything else is passed through as the message.
fn api_error(status: u16, body: &str) -> WeatherError {
    let message = serde_json::from_str::<OwmErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string());
    WeatherError::Api { status, message }
}

fn parse_current(raw: OwmCurrent) -> Result<CurrentWeather, WeatherError> {
    let condition = raw
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MissingField("weather".to_string()))?;

    Ok(CurrentWeather {
        name: raw.name,
        country: raw.sys.and_then(|s| s.country).unwrap_or_default(),
        temperature: raw.main.temp,
        humidity: raw.main.humidity.round().clamp(0.0, 100.0) as u8,
        pressure: raw.main.pressure,
        wind_speed: raw.wind.speed,
        condition: condition.main,
        description: condition.description,
        rain_1h: raw.rain.and_then(|r| r.one_hour),
        coordinates: Coordinates {
            lat: raw.coord.lat,
            lon: raw.coord.lon,
        },
    })
}

fn parse_forecast(raw: OwmForecast) -> Result<Forecast, WeatherError> {
    let mut samples = Vec::with_capacity(raw.list.len());

    for (index, item) in raw.list.into_iter().enumerate() {
        let temperature = item
            .main
            .and_then(|m| m.temp)
            .ok_or(WeatherError::MalformedSample {
                index,
                field: "main.temp",
            })?;
        let condition = item
            .weather
            .into_iter()
            .next()
            .and_then(|w| w.main)
            .ok_or(WeatherError::MalformedSample {
                index,
                field: "weather[0].main",
            })?;

        samples.push(ForecastSample {
            timestamp: item.dt,
            temperature,
            condition,
        });
    }

    Ok(Forecast { samples })
}

fn parse_air_quality(raw: OwmAirPollution) -> Result<AirQuality, WeatherError> {
    raw.list
        .first()
        .map(|entry| AirQuality {
            aqi: entry.main.aqi,
        })
        .ok_or_else(|| WeatherError::MissingField("list".to_string()))
}

/// Error body returned alongside non-success statuses
#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    message: Option<String>,
}

/// Current weather response
#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    #[serde(default)]
    sys: Option<OwmSys>,
    main: OwmMain,
    wind: OwmWind,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    rain: Option<OwmRain>,
    coord: OwmCoord,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

/// 5-day/3-hour forecast response
///
/// Entry fields are optional here so that a missing value is reported as a
/// `MalformedSample` with its position rather than a generic parse error.
#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    #[serde(default)]
    main: Option<OwmForecastMain>,
    #[serde(default)]
    weather: Vec<OwmForecastCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastMain {
    #[serde(default)]
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastCondition {
    #[serde(default)]
    main: Option<String>,
}

/// Air pollution response
#[derive(Debug, Deserialize)]
struct OwmAirPollution {
    list: Vec<OwmAirEntry>,
}

#[derive(Debug, Deserialize)]
struct OwmAirEntry {
    main: OwmAqi,
}

#[derive(Debug, Deserialize)]
struct OwmAqi {
    aqi: u8,
}
