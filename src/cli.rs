//! Command-line interface parsing for the weather dashboard
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a [`StartupConfig`] describing the initial city, units and location source.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::data::{Coordinates, Units};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The supplied coordinates are off the globe
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180 (got {lat}, {lon})")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// `--city` was given but blank
    #[error("City name must not be empty")]
    EmptyCity,
}

/// weatherdash - current weather, 5-day forecast and air quality in your terminal
#[derive(Parser, Debug)]
#[command(name = "weatherdash")]
#[command(about = "Terminal weather dashboard: current conditions, forecast and air quality")]
#[command(version)]
pub struct Cli {
    /// City to show on start-up (skips location lookup)
    #[arg(long, short = 'c', value_name = "CITY")]
    pub city: Option<String>,

    /// Unit system requested from the weather service
    #[arg(long, short = 'u', value_enum)]
    pub units: Option<Units>,

    /// OpenWeatherMap API key (overrides OPENWEATHER_API_KEY and the config file)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Latitude to use instead of IP geolocation
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of IP geolocation
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Do not look up the current location on start-up
    #[arg(long)]
    pub no_locate: bool,
}

/// Where the start-up location comes from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationSource {
    /// Look up the public IP address
    #[default]
    Ip,
    /// Coordinates given on the command line
    Fixed(Coordinates),
    /// No lookup
    Disabled,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// City to load immediately
    pub city: Option<String>,
    /// Unit system override
    pub units: Option<Units>,
    /// API key override
    pub api_key: Option<String>,
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    /// Start-up location source
    pub location: LocationSource,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the city is blank or the coordinates are out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let city = match &cli.city {
            Some(city) if city.trim().is_empty() => return Err(CliError::EmptyCity),
            Some(city) => Some(city.trim().to_string()),
            None => None,
        };

        let location = if cli.no_locate {
            LocationSource::Disabled
        } else {
            match (cli.lat, cli.lon) {
                (Some(lat), Some(lon)) => LocationSource::Fixed(parse_coordinates(lat, lon)?),
                _ => LocationSource::Ip,
            }
        };

        Ok(StartupConfig {
            city,
            units: cli.units,
            api_key: cli.api_key.clone(),
            config_path: cli.config.clone(),
            location,
        })
    }
}

/// Validates a latitude/longitude pair
pub fn parse_coordinates(lat: f64, lon: f64) -> Result<Coordinates, CliError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::InvalidCoordinates { lat, lon });
    }
    Ok(Coordinates { lat, lon })
}
