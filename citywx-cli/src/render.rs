//! Text rendering of controller views.
//!
//! Everything here is a pure function of the view and the local date, so the
//! output is easy to test.

use chrono::{Datelike, NaiveDate};
use citywx_core::{ErrorInfo, Query, RequestState, View, WeatherReport, map_condition_to_icon};

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Drawn when the provider reports a condition without an icon.
const NO_ICON: &str = "·";

pub const SHAKE_HINT: &str = "~ ~ ~  Please enter a city name  ~ ~ ~";

const COLUMN: usize = 26;

pub fn render_view(view: &View, today: NaiveDate, tick: usize) -> String {
    let mut sections = Vec::new();

    if let Some(banner) = &view.banner {
        sections.push(render_banner(banner));
    }
    if view.shake {
        sections.push(SHAKE_HINT.to_string());
    }

    match &view.state {
        RequestState::Idle | RequestState::Loading => {
            sections.push(render_loading(&view.query, tick));
        }
        RequestState::Ready(_) | RequestState::Failed(_) => {
            if let Some(report) = view.panel_report() {
                sections.push(render_panel(report, today));
            }
        }
    }

    sections.join("\n\n")
}

pub fn render_banner(info: &ErrorInfo) -> String {
    format!("[!] {}", capitalize_words(&info.message))
}

pub fn render_loading(query: &Query, tick: usize) -> String {
    format!("{} Looking up the weather in {query}...", spinner_frame(tick))
}

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub fn render_panel(report: &WeatherReport, today: NaiveDate) -> String {
    let icon = map_condition_to_icon(&report.condition).map_or(NO_ICON, |icon| icon.glyph());

    let header = if report.country.is_empty() {
        report.location_name.clone()
    } else {
        format!("{}, {}", report.location_name, report.country)
    };

    let lines = [
        format!("  {icon}  {header}"),
        format!("     {}", format_date(today)),
        String::new(),
        format!("     {}°C", report.temperature_whole()),
        format!("     {}", capitalize_words(&report.description)),
        String::new(),
        two_columns(
            format!("  Visibility  {}", format_visibility(report)),
            format!("Feels like  {}°C", report.feels_like_whole()),
        ),
        two_columns(
            format!("  Humidity    {} %", report.humidity_pct),
            format!("Wind        {} m/s", report.wind_speed_mps),
        ),
    ];

    lines.join("\n")
}

fn format_visibility(report: &WeatherReport) -> String {
    match report.visibility_km() {
        Some(km) => format!("{km} km"),
        None => "n/a".to_string(),
    }
}

/// `d/m/yyyy`, no zero padding.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Uppercases the first letter of every whitespace-separated word.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Machine-readable failure for `show --json`.
pub fn render_error_json(info: &ErrorInfo) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({ "error": info }))
}

pub fn render_json(report: &WeatherReport) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(report)?;
    if let Some(obj) = value.as_object_mut() {
        let icon = map_condition_to_icon(&report.condition).map(|icon| icon.id());
        obj.insert("icon".to_string(), serde_json::json!(icon));
    }
    serde_json::to_string_pretty(&value)
}

fn two_columns(left: String, right: String) -> String {
    format!("{left:<width$}{right}", width = COLUMN)
}
