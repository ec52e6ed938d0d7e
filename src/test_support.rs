//! In-memory weather service for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::data::{
    AirQuality, Coordinates, CurrentWeather, Forecast, ForecastSample, Units, WeatherApi,
    WeatherError,
};

/// 2024-07-15T11:00:00Z
const FIRST_SAMPLE: i64 = 1_721_041_200;

/// Records every call as `op:args` and answers with canned data
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    failing: Option<&'static str>,
    delays: HashMap<String, Duration>,
    unnamed_coordinates: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes one operation fail: "weather", "forecast", "air" or "coords"
    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing = Some(op);
        self
    }

    /// Delays every current-weather request for `city`
    pub fn slow_city(mut self, city: &str, delay: Duration) -> Self {
        self.delays.insert(city.to_string(), delay);
        self
    }

    /// Coordinate lookups answer with an empty place name
    pub fn unnamed_coordinates(mut self) -> Self {
        self.unnamed_coordinates = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check(&self, op: &str) -> Result<(), WeatherError> {
        if self.failing == Some(op) {
            return Err(WeatherError::Api {
                status: 404,
                message: "city not found".to_string(),
            });
        }
        Ok(())
    }
}

pub fn weather_named(name: &str, units: Units) -> CurrentWeather {
    CurrentWeather {
        name: name.to_string(),
        country: "NO".to_string(),
        temperature: match units {
            Units::Metric => 20.0,
            Units::Imperial => 68.0,
        },
        humidity: 55,
        pressure: 1013.0,
        wind_speed: 3.5,
        condition: "Clouds".to_string(),
        description: "few clouds".to_string(),
        rain_1h: None,
        coordinates: Coordinates {
            lat: 59.91,
            lon: 10.75,
        },
    }
}

pub fn sample_forecast() -> Forecast {
    Forecast {
        samples: vec![
            ForecastSample {
                timestamp: FIRST_SAMPLE,
                temperature: 10.0,
                condition: "Clear".to_string(),
            },
            ForecastSample {
                timestamp: FIRST_SAMPLE + 3600,
                temperature: 12.0,
                condition: "Rain".to_string(),
            },
            ForecastSample {
                timestamp: FIRST_SAMPLE + 7200,
                temperature: 14.0,
                condition: "Rain".to_string(),
            },
        ],
    }
}

#[async_trait]
impl WeatherApi for FakeApi {
    async fn current_by_city(
        &self,
        city: &str,
        units: Units,
    ) -> Result<CurrentWeather, WeatherError> {
        self.record(format!("weather:{}:{}", city, units));
        if let Some(delay) = self.delays.get(city) {
            tokio::time::sleep(*delay).await;
        }
        self.check("weather")?;
        Ok(weather_named(city, units))
    }

    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<CurrentWeather, WeatherError> {
        self.record(format!(
            "coords:{},{}:{}",
            coordinates.lat, coordinates.lon, units
        ));
        self.check("coords")?;
        let name = if self.unnamed_coordinates { "" } else { "Vancouver" };
        Ok(weather_named(name, units))
    }

    async fn forecast(&self, city: &str, units: Units) -> Result<Forecast, WeatherError> {
        self.record(format!("forecast:{}:{}", city, units));
        self.check("forecast")?;
        Ok(sample_forecast())
    }

    async fn air_quality(&self, coordinates: Coordinates) -> Result<AirQuality, WeatherError> {
        self.record(format!("air:{},{}", coordinates.lat, coordinates.lon));
        self.check("air")?;
        Ok(AirQuality { aqi: 2 })
    }
}
