//! Application state management for the weather dashboard
//!
//! This module owns the dashboard state and is the only place it changes:
//! keyboard input, city and unit changes, fetch results and the start-up
//! location lookup all go through [`App`]. The UI reads the state and never
//! writes it.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{
    AirQuality, CurrentWeather, DailySummary, Forecast, Geolocator, Units, WeatherApi,
    WeatherError,
};
use crate::fetch::{FetchMessage, Fetcher, ResolveError, WeatherReport};
use crate::history::{HistoryStore, SearchHistory};

/// Errors surfaced to the user as the dashboard's error line
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The user submitted no city
    #[error("Please enter a city name.")]
    EmptyCityInput,

    /// Any of the three requests of a fetch cycle failed
    #[error("City not found! Try another one.")]
    FetchFailure(#[source] WeatherError),

    /// The start-up location could not be resolved
    #[error("Unable to retrieve location data")]
    GeolocationFailure(#[source] ResolveError),
}

/// Which input mode the dashboard is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Normal view; single keys trigger actions
    Dashboard,
    /// Typing a city name into the search box
    EditingCity,
}

/// Everything the dashboard displays
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// City currently shown (empty until one is chosen)
    pub city: String,
    pub units: Units,
    pub weather: Option<CurrentWeather>,
    pub forecast: Option<Forecast>,
    /// Per-day summaries derived from `forecast`
    pub daily: Vec<DailySummary>,
    pub air_quality: Option<AirQuality>,
    /// User-facing error message
    pub error: Option<String>,
    pub history: SearchHistory,
}

/// Main application struct managing state and data
pub struct App {
    /// Current input mode
    pub state: AppState,
    /// Data shown on the dashboard
    pub dashboard: DashboardState,
    /// Text typed into the search box
    pub input: String,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// When the shown data was last committed
    pub last_updated: Option<DateTime<Local>>,
    /// Generation of the newest fetch cycle; older results are dropped
    generation: u64,
    /// Whether the newest fetch cycle is still running
    loading: bool,
    /// Whether a location lookup is running
    locating: bool,
    fetcher: Fetcher,
    store: Option<HistoryStore>,
}

impl App {
    /// Creates a new App with no city selected
    pub fn new(api: Arc<dyn WeatherApi>, locator: Arc<dyn Geolocator>, units: Units) -> Self {
        Self {
            state: AppState::Dashboard,
            dashboard: DashboardState {
                units,
                ..DashboardState::default()
            },
            input: String::new(),
            should_quit: false,
            show_help: false,
            last_updated: None,
            generation: 0,
            loading: false,
            locating: false,
            fetcher: Fetcher::new(api, locator),
            store: None,
        }
    }

    /// Loads the search history from `store` and saves changes back to it
    pub fn with_store(mut self, store: HistoryStore) -> Self {
        self.dashboard.history = store.load();
        self.store = Some(store);
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switches to a new city and starts a fetch cycle for it.
    ///
    /// A blank name sets the empty-input error and issues no request. Other
    /// state is left as is until the cycle completes.
    pub fn set_city(&mut self, name: &str) -> Result<(), ControllerError> {
        let city = name.trim();
        if city.is_empty() {
            self.report(ControllerError::EmptyCityInput);
            return Err(ControllerError::EmptyCityInput);
        }

        self.dashboard.city = city.to_string();
        if self.dashboard.history.record(city) {
            self.persist_history();
        }

        self.start_fetch();
        Ok(())
    }

    /// Re-fetches the current city
    pub fn refresh(&mut self) -> Result<(), ControllerError> {
        if self.dashboard.city.is_empty() {
            self.report(ControllerError::EmptyCityInput);
            return Err(ControllerError::EmptyCityInput);
        }
        self.start_fetch();
        Ok(())
    }

    /// Flips metric/imperial and re-fetches the current city, if any
    pub fn toggle_units(&mut self) {
        self.dashboard.units = self.dashboard.units.toggle();
        info!(units = %self.dashboard.units, "units changed");
        if !self.dashboard.city.is_empty() {
            self.start_fetch();
        }
    }

    /// Switches to the history entry at `index`, if there is one
    pub fn select_history(&mut self, index: usize) -> Option<Result<(), ControllerError>> {
        let city = self.dashboard.history.get(index)?.to_string();
        Some(self.set_city(&city))
    }

    /// Starts looking up the host location; on success the resolved city is
    /// selected as if the user had typed it
    pub fn resolve_current_location(&mut self) {
        self.locating = true;
        self.fetcher.spawn_locate(self.dashboard.units);
    }

    /// Applies a finished fetch or location result
    pub fn apply(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Report {
                generation,
                city,
                result,
            } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        city = %city,
                        "dropping stale fetch result"
                    );
                    return;
                }
                self.loading = false;
                match result {
                    Ok(report) => self.commit(report),
                    Err(e) => self.fail(ControllerError::FetchFailure(e)),
                }
            }
            FetchMessage::Located(result) => {
                self.locating = false;
                match result {
                    Ok(name) if name.trim().is_empty() => {
                        warn!("location resolved to a place without a name");
                        if self.dashboard.city.is_empty() {
                            self.report(ControllerError::GeolocationFailure(
                                ResolveError::Unnamed,
                            ));
                        }
                    }
                    Ok(name) if self.dashboard.city.is_empty() => {
                        info!(city = %name, "resolved current location");
                        let _ = self.set_city(&name);
                    }
                    Ok(name) => {
                        debug!(city = %name, "ignoring location, a city was already chosen");
                    }
                    Err(e) => {
                        warn!(error = %e, "location lookup failed");
                        if self.dashboard.city.is_empty() {
                            self.report(ControllerError::GeolocationFailure(e));
                        }
                    }
                }
            }
        }
    }

    /// Applies every result that has arrived so far; returns how many
    pub fn process_messages(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.fetcher.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Waits for the next result and applies it
    pub async fn wait_for_message(&mut self) -> bool {
        match self.fetcher.recv().await {
            Some(message) => {
                self.apply(message);
                true
            }
            None => false,
        }
    }

    fn start_fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        info!(
            generation = self.generation,
            city = %self.dashboard.city,
            units = %self.dashboard.units,
            "starting fetch cycle"
        );
        self.fetcher.spawn_report(
            self.generation,
            self.dashboard.city.clone(),
            self.dashboard.units,
        );
    }

    fn commit(&mut self, report: WeatherReport) {
        info!(city = %report.weather.name, days = report.daily.len(), "weather updated");
        self.dashboard.weather = Some(report.weather);
        self.dashboard.forecast = Some(report.forecast);
        self.dashboard.daily = report.daily;
        self.dashboard.air_quality = Some(report.air_quality);
        self.dashboard.error = None;
        self.last_updated = Some(Local::now());
    }

    /// Clears all fetched data and shows the error
    fn fail(&mut self, error: ControllerError) {
        if let ControllerError::FetchFailure(source) = &error {
            warn!(city = %self.dashboard.city, error = %source, "fetch cycle failed");
        }
        self.dashboard.weather = None;
        self.dashboard.forecast = None;
        self.dashboard.daily.clear();
        self.dashboard.air_quality = None;
        self.report(error);
    }

    fn report(&mut self, error: ControllerError) {
        self.dashboard.error = Some(error.to_string());
    }

    fn persist_history(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.dashboard.history) {
                warn!(error = %e, "failed to save search history");
            }
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// Dashboard:
    /// - `/`, `e`: Edit the city
    /// - `u`: Toggle metric/imperial
    /// - `r`: Refresh the current city
    /// - `1`-`5`: Show a recent search
    /// - `?`: Toggle help
    /// - `q`, `Esc`, `Ctrl+C`: Quit
    ///
    /// Editing:
    /// - characters: Type, `Backspace`: Delete
    /// - `Enter`: Search, `Esc`: Cancel
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Dashboard => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char('/') | KeyCode::Char('e') => {
                    self.input.clear();
                    self.state = AppState::EditingCity;
                }
                KeyCode::Char('u') => {
                    self.toggle_units();
                }
                KeyCode::Char('r') => {
                    let _ = self.refresh();
                }
                KeyCode::Char(c @ '1'..='5') => {
                    let index = c as usize - '1' as usize;
                    let _ = self.select_history(index);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::EditingCity => match key_event.code {
                KeyCode::Enter => {
                    let city = std::mem::take(&mut self.input);
                    self.state = AppState::Dashboard;
                    let _ = self.set_city(&city);
                }
                KeyCode::Esc => {
                    self.input.clear();
                    self.state = AppState::Dashboard;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                }
                _ => {}
            },
        }
    }
}
