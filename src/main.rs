//! weatherdash - current weather, 5-day forecast and air quality in the terminal
//!
//! A terminal UI application that shows the weather for a searched city, or for
//! the host's location when no city is given.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use weatherdash::app::App;
use weatherdash::cli::{Cli, LocationSource, StartupConfig};
use weatherdash::config::{Config, API_KEY_ENV};
use weatherdash::data::{
    FixedLocation, Geolocator, IpGeolocator, NoLocation, OpenWeatherClient, WeatherApi,
};
use weatherdash::history::HistoryStore;
use weatherdash::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Picks the start-up locator from the command line and config
fn build_locator(
    startup: &StartupConfig,
    config: &Config,
) -> Result<Arc<dyn Geolocator>, Box<dyn std::error::Error>> {
    if !config.locate_on_startup {
        return Ok(Arc::new(NoLocation));
    }
    let locator: Arc<dyn Geolocator> = match startup.location {
        LocationSource::Disabled => Arc::new(NoLocation),
        LocationSource::Fixed(coordinates) => Arc::new(FixedLocation(coordinates)),
        LocationSource::Ip => Arc::new(
            IpGeolocator::new()
                .with_url(config.locator_url.clone())
                .with_timeout(config.timeout())?,
        ),
    };
    Ok(locator)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    let config = match Config::load(startup.config_path.as_deref()) {
        Ok(config) => config
            .with_env_key(std::env::var(API_KEY_ENV).ok())
            .with_startup(&startup),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let api_key = match config.api_key() {
        Ok(key) => key.to_string(),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    // Logging is best effort; the dashboard runs without it
    if let Some(dir) = logging::default_log_dir() {
        if let Err(e) = logging::init(&dir) {
            eprintln!("warning: logging disabled: {}", e);
        }
    }
    info!(units = %config.units, "starting weatherdash");

    let api: Arc<dyn WeatherApi> = Arc::new(
        OpenWeatherClient::with_timeout(api_key, config.timeout())?
            .with_base_url(config.base_url.clone()),
    );
    let locator = build_locator(&startup, &config)?;

    let mut app = App::new(api, locator, config.units);
    match HistoryStore::new() {
        Some(store) => app = app.with_store(store),
        None => warn!("no data directory, search history will not be saved"),
    }

    match &startup.city {
        Some(city) => {
            let _ = app.set_city(city);
        }
        None if config.locate_on_startup && startup.location != LocationSource::Disabled => {
            app.resolve_current_location();
        }
        None => {}
    }

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        // Apply any finished fetches before drawing
        app.process_messages();

        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    info!("exiting");

    Ok(())
}
