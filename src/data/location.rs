//! Host location lookup used to pick a starting city
//!
//! A terminal has no device location API, so the default source is an IP
//! geolocation service. Coordinates can also be given on the command line, or
//! the lookup can be switched off entirely.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::Coordinates;

/// Default IP geolocation endpoint (no key required)
pub const IP_API_URL: &str = "http://ip-api.com/json/";

/// Errors that can occur while resolving the host location
#[derive(Debug, Error)]
pub enum LocationError {
    /// Location lookup is switched off
    #[error("Location lookup is disabled")]
    Disabled,

    /// The lookup request failed
    #[error("Location request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service could not place this host
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// A source of the host's coordinates
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Locates the host by its public IP address
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            url: IP_API_URL.to_string(),
        }
    }

    /// Use a different endpoint with the ip-api.com response shape
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Give up on the lookup after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LocationError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let response: IpApiResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_ip_response(response)
    }
}

/// Always answers with the same coordinates
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Never locates; used when the lookup is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl Geolocator for NoLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Disabled)
    }
}

fn parse_ip_response(response: IpApiResponse) -> Result<Coordinates, LocationError> {
    if response.status != "success" {
        return Err(LocationError::Unavailable(
            response.message.unwrap_or_else(|| response.status.clone()),
        ));
    }

    match (response.lat, response.lon) {
        (Some(lat), Some(lon)) => Ok(Coordinates { lat, lon }),
        _ => Err(LocationError::Unavailable(
            "response has no coordinates".to_string(),
        )),
    }
}

/// ip-api.com JSON response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}
