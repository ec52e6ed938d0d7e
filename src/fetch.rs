//! Background fetch cycles
//!
//! Network work runs on spawned tokio tasks so the dashboard keeps drawing
//! while requests are in flight. Results come back to the application over a
//! channel, tagged with the generation they were started under.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::data::{
    AirQuality, CurrentWeather, DailySummary, Forecast, Geolocator, LocationError, Units,
    WeatherApi, WeatherError,
};
use crate::forecast::aggregate;

/// Everything one successful fetch cycle produces
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub weather: CurrentWeather,
    pub forecast: Forecast,
    pub daily: Vec<DailySummary>,
    pub air_quality: AirQuality,
}

/// Why the start-up location could not be turned into a city
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Weather lookup for location failed: {0}")]
    Weather(#[from] WeatherError),

    /// The coordinates resolved to a place with no name (e.g. open water)
    #[error("Location has no place name")]
    Unnamed,
}

/// Messages sent from fetch tasks to the application
#[derive(Debug)]
pub enum FetchMessage {
    /// A fetch cycle finished
    Report {
        generation: u64,
        city: String,
        result: Result<WeatherReport, WeatherError>,
    },
    /// The start-up location resolved to a city name, or failed to
    Located(Result<String, ResolveError>),
}

/// Runs one fetch cycle for `city`.
///
/// Air quality needs the coordinates from the current weather response, so
/// those two run in sequence; the forecast runs alongside them. Any failure
/// fails the whole cycle.
pub async fn fetch_all(
    api: &dyn WeatherApi,
    city: &str,
    units: Units,
) -> Result<WeatherReport, WeatherError> {
    let conditions = async {
        let weather = api.current_by_city(city, units).await?;
        let air_quality = api.air_quality(weather.coordinates).await?;
        Ok::<_, WeatherError>((weather, air_quality))
    };

    let ((weather, air_quality), forecast) =
        futures::future::try_join(conditions, api.forecast(city, units)).await?;

    let daily = aggregate(&forecast.samples);
    debug!(city, days = daily.len(), "fetch cycle complete");

    Ok(WeatherReport {
        weather,
        forecast,
        daily,
        air_quality,
    })
}

/// Locates the host and names the city the weather service puts there
pub async fn resolve_location(
    api: &dyn WeatherApi,
    locator: &dyn Geolocator,
    units: Units,
) -> Result<String, ResolveError> {
    let coordinates = locator.locate().await?;
    let weather = api.current_by_coordinates(coordinates, units).await?;
    if weather.name.trim().is_empty() {
        return Err(ResolveError::Unnamed);
    }
    Ok(weather.name)
}

/// Spawns fetch tasks and collects their results
pub struct Fetcher {
    api: Arc<dyn WeatherApi>,
    locator: Arc<dyn Geolocator>,
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn WeatherApi>, locator: Arc<dyn Geolocator>) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            api,
            locator,
            sender,
            receiver,
        }
    }

    /// Starts a fetch cycle; the result arrives as [`FetchMessage::Report`]
    pub fn spawn_report(&self, generation: u64, city: String, units: Units) {
        let api = Arc::clone(&self.api);
        let tx = self.sender.clone();

        tokio::spawn(async move {
            let result = fetch_all(api.as_ref(), &city, units).await;
            let _ = tx
                .send(FetchMessage::Report {
                    generation,
                    city,
                    result,
                })
                .await;
        });
    }

    /// Starts a location lookup; the result arrives as [`FetchMessage::Located`]
    pub fn spawn_locate(&self, units: Units) {
        let api = Arc::clone(&self.api);
        let locator = Arc::clone(&self.locator);
        let tx = self.sender.clone();

        tokio::spawn(async move {
            let result = resolve_location(api.as_ref(), locator.as_ref(), units).await;
            let _ = tx.send(FetchMessage::Located(result)).await;
        });
    }

    /// Returns a finished result without blocking, if there is one
    pub fn try_recv(&mut self) -> Option<FetchMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next finished result
    pub async fn recv(&mut self) -> Option<FetchMessage> {
        self.receiver.recv().await
    }
}
