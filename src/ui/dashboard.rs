//! Main dashboard screen
//!
//! Search box, recent cities and status line on top; current conditions,
//! daily forecast and charts below.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::charts;
use crate::app::{App, AppState};
use crate::data::{AirQuality, CurrentWeather, DailySummary, Units};
use crate::history::SearchHistory;

mod colors {
    use ratatui::style::Color;

    /// Section borders and key hints
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Missing data
    pub const UNKNOWN: Color = Color::DarkGray;
    /// Error line
    pub const ERROR: Color = Color::Red;
    /// Text being typed
    pub const EDITING: Color = Color::Yellow;
}

/// Renders the dashboard
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Length(1), // Recent cities
            Constraint::Length(1), // Status / error
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_search(frame, chunks[0], app);
    frame.render_widget(
        Paragraph::new(history_line(&app.dashboard.history)),
        chunks[1],
    );
    frame.render_widget(Paragraph::new(status_line(app)), chunks[2]);

    match &app.dashboard.weather {
        Some(weather) => render_body(frame, chunks[3], app, weather),
        None => render_placeholder(frame, chunks[3], app),
    }

    render_help_text(frame, chunks[4], app.state);
}

fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.state == AppState::EditingCity;
    let (text, style) = if editing {
        (format!("{}_", app.input), Style::default().fg(colors::EDITING))
    } else if app.dashboard.city.is_empty() {
        (
            "Press / to search for a city".to_string(),
            Style::default().fg(colors::UNKNOWN),
        )
    } else {
        (
            app.dashboard.city.clone(),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            colors::EDITING
        } else {
            colors::HEADER
        }))
        .title(" City ")
        .title_bottom(
            Line::from(format!(" {} ", unit_label(app.dashboard.units))).right_aligned(),
        );

    frame.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
}

fn unit_label(units: Units) -> &'static str {
    match units {
        Units::Metric => "Metric °C",
        Units::Imperial => "Imperial °F",
    }
}

/// "Recent: 1 Oslo  2 Lima ..." or nothing when no city was searched yet
pub fn history_line(history: &SearchHistory) -> Line<'static> {
    if history.is_empty() {
        return Line::default();
    }

    let mut spans = vec![Span::styled(
        "Recent: ",
        Style::default().fg(colors::SECONDARY),
    )];
    for (i, city) in history.iter().enumerate() {
        spans.push(Span::styled(
            format!("{} ", i + 1),
            Style::default().fg(colors::HEADER),
        ));
        spans.push(Span::raw(format!("{}  ", city)));
    }
    Line::from(spans)
}

/// Error first, then loading state, then the last update time
fn status_line(app: &App) -> Line<'static> {
    if let Some(error) = &app.dashboard.error {
        return Line::from(Span::styled(
            error.clone(),
            Style::default()
                .fg(colors::ERROR)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if app.is_loading() {
        return Line::from(Span::styled(
            format!("Loading weather for {}...", app.dashboard.city),
            Style::default().fg(colors::SECONDARY),
        ));
    }
    if app.is_locating() {
        return Line::from(Span::styled(
            "Finding your location...",
            Style::default().fg(colors::SECONDARY),
        ));
    }
    match app.last_updated {
        Some(at) => Line::from(Span::styled(
            format!("Updated {}", at.format("%H:%M:%S")),
            Style::default().fg(colors::UNKNOWN),
        )),
        None => Line::default(),
    }
}

fn render_body(frame: &mut Frame, area: Rect, app: &App, weather: &CurrentWeather) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(columns[0]);

    let units = app.dashboard.units;
    let current = build_current_lines(weather, app.dashboard.air_quality.as_ref(), units);
    frame.render_widget(
        Paragraph::new(current).block(section_block(&format!(
            "{}, {}",
            weather.name, weather.country
        ))),
        left[0],
    );

    let daily = build_daily_lines(&app.dashboard.daily, units);
    frame.render_widget(
        Paragraph::new(daily).block(section_block("Daily Forecast")),
        left[1],
    );

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(columns[1]);

    let samples = app
        .dashboard
        .forecast
        .as_ref()
        .map(|f| f.samples.as_slice())
        .unwrap_or_default();
    charts::render_temperature_trend(frame, right[0], samples, units);
    charts::render_condition_distribution(frame, right[1], samples);
    charts::render_current_metrics(frame, right[2], weather, units);
}

fn section_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Lines for the current conditions panel
pub fn build_current_lines(
    weather: &CurrentWeather,
    air_quality: Option<&AirQuality>,
    units: Units,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{:.1}{}", weather.temperature, units.temperature_suffix()),
                Style::default()
                    .fg(temperature_color(weather.temperature, units))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(format!("{} ", condition_icon(&weather.condition))),
            Span::raw(weather.condition.clone()),
        ]),
        Line::from(Span::styled(
            weather.description.clone(),
            Style::default().fg(colors::SECONDARY),
        )),
        label_line("Humidity", format!("{}%", weather.humidity)),
        label_line(
            "Wind",
            format!("{:.1} {}", weather.wind_speed, units.speed_suffix()),
        ),
        label_line("Pressure", format!("{:.0} hPa", weather.pressure)),
    ];

    if let Some(rain) = weather.rain_1h {
        lines.push(label_line("Rain (1h)", format!("{:.1} mm", rain)));
    }

    lines.push(match air_quality {
        Some(aq) => Line::from(vec![
            Span::styled("Air quality: ", Style::default().fg(colors::SECONDARY)),
            Span::styled(
                format!("{} ({})", aq.aqi, aq.level()),
                Style::default().fg(aqi_color(aq.aqi)),
            ),
        ]),
        None => label_line("Air quality", "--".to_string()),
    });

    lines
}

fn label_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(colors::SECONDARY)),
        Span::raw(value),
    ])
}

/// One line per calendar day
pub fn build_daily_lines(daily: &[DailySummary], units: Units) -> Vec<Line<'static>> {
    if daily.is_empty() {
        return vec![Line::from(Span::styled(
            "No forecast",
            Style::default().fg(colors::UNKNOWN),
        ))];
    }

    daily
        .iter()
        .map(|day| {
            Line::from(vec![
                Span::styled(
                    format!("{:<11}", day.calendar_date.format("%a %d %b").to_string()),
                    Style::default().fg(colors::PRIMARY),
                ),
                Span::styled(
                    format!(
                        "{:>8.2}{}",
                        day.average_temperature,
                        units.temperature_suffix()
                    ),
                    Style::default().fg(temperature_color(day.average_temperature, units)),
                ),
                Span::raw("  "),
                Span::raw(format!(
                    "{} {}",
                    condition_icon(&day.representative_condition),
                    day.representative_condition
                )),
            ])
        })
        .collect()
}

fn render_placeholder(frame: &mut Frame, area: Rect, app: &App) {
    let message = if app.is_loading() || app.is_locating() {
        "Loading..."
    } else {
        "No weather data"
    };

    let paragraph = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(message, Style::default().fg(colors::UNKNOWN))),
    ])
    .alignment(Alignment::Center)
    .block(section_block("Weather"));

    frame.render_widget(paragraph, area);
}

fn render_help_text(frame: &mut Frame, area: Rect, state: AppState) {
    let hints: &[(&str, &str)] = match state {
        AppState::EditingCity => &[("Enter", "Search"), ("Esc", "Cancel")],
        AppState::Dashboard => &[
            ("/", "City"),
            ("u", "Units"),
            ("r", "Refresh"),
            ("1-5", "Recent"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(*key, Style::default().fg(colors::HEADER)));
        spans.push(Span::styled(
            format!(" {}  ", action),
            Style::default().fg(colors::SECONDARY),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Returns an icon for an OpenWeatherMap condition group
fn condition_icon(condition: &str) -> &'static str {
    match condition {
        "Clear" => "\u{2600}",            // ☀
        "Clouds" => "\u{2601}",           // ☁
        "Rain" | "Drizzle" => "\u{2602}", // ☂
        "Thunderstorm" => "\u{26A1}",     // ⚡
        "Snow" => "\u{2744}",             // ❄
        _ => "\u{2248}",                  // ≈
    }
}

/// Returns the color for a temperature value
fn temperature_color(temp: f64, units: Units) -> Color {
    let celsius = match units {
        Units::Metric => temp,
        Units::Imperial => (temp - 32.0) * 5.0 / 9.0,
    };
    if celsius >= 30.0 {
        Color::Red
    } else if celsius >= 25.0 {
        Color::LightRed
    } else if celsius >= 20.0 {
        Color::Yellow
    } else if celsius >= 15.0 {
        Color::Green
    } else if celsius >= 10.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

fn aqi_color(aqi: u8) -> Color {
    match aqi {
        1 | 2 => Color::Green,
        3 => Color::Yellow,
        4 | 5 => Color::Red,
        _ => colors::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NoLocation;
    use crate::fetch::{FetchMessage, WeatherReport};
    use crate::forecast::aggregate;
    use crate::test_support::{sample_forecast, weather_named, FakeApi};
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn test_app() -> App {
        App::new(Arc::new(FakeApi::new()), Arc::new(NoLocation), Units::Metric)
    }

    fn app_with_report() -> App {
        let mut app = test_app();
        app.apply(FetchMessage::Report {
            generation: 0,
            city: "Oslo".to_string(),
            result: Ok(WeatherReport {
                weather: weather_named("Oslo", Units::Metric),
                forecast: sample_forecast(),
                daily: aggregate(&sample_forecast().samples),
                air_quality: AirQuality { aqi: 4 },
            }),
        });
        app.dashboard.city = "Oslo".to_string();
        app
    }

    fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_empty_dashboard_prompts_for_city() {
        let content = render_to_string(&test_app(), 100, 30);
        assert!(content.contains("Press / to search"));
        assert!(content.contains("No weather data"));
    }

    #[test]
    fn test_dashboard_renders_weather() {
        let content = render_to_string(&app_with_report(), 120, 40);
        assert!(content.contains("Oslo, NO"));
        assert!(content.contains("20.0°C"));
        assert!(content.contains("Daily Forecast"));
        assert!(content.contains("Temperature"));
        assert!(content.contains("Poor"));
    }

    #[test]
    fn test_dashboard_shows_error() {
        let mut app = test_app();
        app.dashboard.error = Some("City not found! Try another one.".to_string());
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("City not found!"));
    }

    #[test]
    fn test_editing_shows_input() {
        let mut app = test_app();
        app.state = AppState::EditingCity;
        app.input = "Berg".to_string();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Berg_"));
        assert!(content.contains("Cancel"));
    }

    #[test]
    fn test_history_line_numbers_entries() {
        let history = SearchHistory::from_entries(vec!["Oslo".to_string(), "Lima".to_string()]);
        let text = line_text(&history_line(&history));
        assert!(text.contains("1 Oslo"));
        assert!(text.contains("2 Lima"));
    }

    #[test]
    fn test_history_line_empty() {
        assert!(history_line(&SearchHistory::new()).spans.is_empty());
    }

    #[test]
    fn test_current_lines_include_rain_when_present() {
        let mut weather = weather_named("Oslo", Units::Metric);
        weather.rain_1h = Some(1.5);
        let lines = build_current_lines(&weather, None, Units::Metric);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("Rain (1h): 1.5 mm")));
        assert!(text.iter().any(|l| l.contains("Air quality: --")));
    }

    #[test]
    fn test_current_lines_imperial_suffixes() {
        let weather = weather_named("Oslo", Units::Imperial);
        let lines = build_current_lines(&weather, Some(&AirQuality { aqi: 1 }), Units::Imperial);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert!(text[0].contains("68.0°F"));
        assert!(text.iter().any(|l| l.contains("mph")));
        assert!(text.iter().any(|l| l.contains("1 (Good)")));
    }

    #[test]
    fn test_daily_lines_show_average_and_condition() {
        let daily = vec![DailySummary {
            calendar_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            average_temperature: 10.13,
            representative_condition: "Clear".to_string(),
        }];
        let text = line_text(&build_daily_lines(&daily, Units::Metric)[0]);
        assert!(text.contains("Mon 15 Jul"));
        assert!(text.contains("10.13°C"));
        assert!(text.contains("Clear"));
    }

    #[test]
    fn test_daily_lines_empty() {
        let text = line_text(&build_daily_lines(&[], Units::Metric)[0]);
        assert_eq!(text, "No forecast");
    }

    #[test]
    fn test_temperature_color_converts_imperial() {
        assert_eq!(temperature_color(86.0, Units::Imperial), Color::Red);
        assert_eq!(temperature_color(30.0, Units::Metric), Color::Red);
        assert_eq!(temperature_color(30.0, Units::Imperial), Color::Blue);
    }
}
