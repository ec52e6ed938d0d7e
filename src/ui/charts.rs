//! Dashboard charts
//!
//! Temperature trend over the next forecast slots, condition distribution
//! across the whole forecast, and the current readings side by side.

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::data::{CurrentWeather, ForecastSample, Units};
use crate::forecast::condition_distribution;

/// Number of upcoming forecast slots plotted on the temperature chart
pub const TREND_SAMPLES: usize = 5;

/// (slot index, temperature) for the first [`TREND_SAMPLES`] samples
pub fn temperature_points(samples: &[ForecastSample]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .take(TREND_SAMPLES)
        .enumerate()
        .map(|(i, s)| (i as f64, s.temperature))
        .collect()
}

/// Y bounds padded by one degree so the line does not sit on the border
fn temperature_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        [min.floor() - 1.0, max.ceil() + 1.0]
    } else {
        [0.0, 1.0]
    }
}

/// Local "HH:MM" for a forecast timestamp
fn slot_label(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn chart_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

/// Line chart of the upcoming temperatures
pub fn render_temperature_trend(
    frame: &mut Frame,
    area: Rect,
    samples: &[ForecastSample],
    units: Units,
) {
    let points = temperature_points(samples);
    let [low, high] = temperature_bounds(&points);

    let x_labels: Vec<Span> = samples
        .iter()
        .take(TREND_SAMPLES)
        .map(|s| Span::raw(slot_label(s.timestamp)))
        .collect();
    let y_labels = vec![
        Span::raw(format!("{:.0}", low)),
        Span::raw(format!("{:.0}", (low + high) / 2.0)),
        Span::raw(format!("{:.0}", high)),
    ];

    let dataset = Dataset::default()
        .name(units.temperature_suffix())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(chart_block("Temperature"))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (points.len().max(2) - 1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([low, high])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

/// Bars for (label, count) pairs of the condition distribution
pub fn distribution_bars(samples: &[ForecastSample]) -> Vec<Bar<'static>> {
    condition_distribution(samples)
        .entries()
        .into_iter()
        .map(|(label, count)| {
            Bar::default()
                .value(count)
                .label(Line::from(label))
                .style(Style::default().fg(condition_color(label)))
        })
        .collect()
}

/// Bar chart of how many forecast slots fall in each condition group
pub fn render_condition_distribution(frame: &mut Frame, area: Rect, samples: &[ForecastSample]) {
    let bars = distribution_bars(samples);
    let chart = BarChart::default()
        .block(chart_block("Conditions"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

/// Bars for the current temperature, humidity, wind and pressure.
///
/// Bar heights are clamped at zero; the printed value is the real reading.
pub fn metric_bars(weather: &CurrentWeather, units: Units) -> Vec<Bar<'static>> {
    let metrics = [
        ("Temp", weather.temperature, units.temperature_suffix(), Color::Yellow),
        ("Humid", f64::from(weather.humidity), "%", Color::Cyan),
        ("Wind", weather.wind_speed, units.speed_suffix(), Color::Green),
        ("Press", weather.pressure, "hPa", Color::Magenta),
    ];

    metrics
        .into_iter()
        .map(|(label, value, suffix, color)| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{:.0}{}", value, suffix))
                .label(Line::from(label))
                .style(Style::default().fg(color))
        })
        .collect()
}

/// Bar chart of the current readings
pub fn render_current_metrics(
    frame: &mut Frame,
    area: Rect,
    weather: &CurrentWeather,
    units: Units,
) {
    let bars = metric_bars(weather, units);
    let chart = BarChart::default()
        .block(chart_block("Now"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(2);

    frame.render_widget(chart, area);
}

fn condition_color(label: &str) -> Color {
    match label {
        "Clear" => Color::Yellow,
        "Clouds" => Color::Gray,
        "Rain" => Color::Blue,
        "Snow" => Color::White,
        _ => Color::DarkGray,
    }
}
