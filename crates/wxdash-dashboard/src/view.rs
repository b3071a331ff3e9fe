//! Render-ready projection of the dashboard state

use std::fmt::{self, Write as _};

use chrono::{NaiveDate, NaiveDateTime};
use wxdash_core::{ForecastEntry, SearchHistory, Unit, WeatherReport};

use crate::controller::UiState;

const MISSING: &str = "n/a";
const DATE_FORMAT: &str = "%-m/%-d/%Y";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub name: String,
    pub date: String,
    pub description: String,
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCard {
    pub date: String,
    pub description: String,
    pub temperature: String,
    pub humidity: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub city_input: String,
    pub unit: Unit,
    pub toggle_label: String,
    pub history: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    /// Hidden while loading
    pub weather: Option<WeatherCard>,
    /// Hidden while loading
    pub forecast: Vec<ForecastCard>,
}

/// Label of the unit switch: names the system it switches *to*
pub fn toggle_label(unit: Unit) -> String {
    format!("Switch to {}", unit.toggle().temperature_suffix())
}

impl DashboardView {
    pub fn build(state: &UiState, history: &SearchHistory, today: NaiveDate) -> Self {
        let unit = state.unit;
        let weather = match (&state.weather, state.loading) {
            (Some(report), false) => Some(WeatherCard::build(report, unit, today)),
            _ => None,
        };
        let forecast = if state.loading {
            Vec::new()
        } else {
            state
                .forecast
                .iter()
                .map(|entry| ForecastCard::build(entry, unit))
                .collect()
        };

        Self {
            city_input: state.city.clone(),
            unit,
            toggle_label: toggle_label(unit),
            history: history.entries().to_vec(),
            loading: state.loading,
            error: state.error.map(|e| e.to_string()),
            weather,
            forecast,
        }
    }
}

impl WeatherCard {
    fn build(report: &WeatherReport, unit: Unit, today: NaiveDate) -> Self {
        Self {
            name: text(report.name()),
            date: today.format(DATE_FORMAT).to_string(),
            description: text(report.description()),
            temperature: measure(report.temp(), unit.temperature_suffix()),
            humidity: percent(report.humidity()),
            wind: measure(report.wind_speed(), unit.speed_suffix()),
            icon_url: report.icon_url(),
        }
    }
}

impl ForecastCard {
    fn build(entry: &ForecastEntry, unit: Unit) -> Self {
        Self {
            date: entry.dt_txt().map(forecast_date).unwrap_or_else(|| MISSING.to_string()),
            description: text(entry.description()),
            temperature: measure(entry.temp(), unit.temperature_suffix()),
            humidity: percent(entry.humidity()),
            icon_url: entry.icon_url(),
        }
    }
}

fn forecast_date(dt_txt: &str) -> String {
    NaiveDateTime::parse_from_str(dt_txt, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|_| dt_txt.to_string())
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

fn measure(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v} {suffix}"),
        None => MISSING.to_string(),
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}%"),
        None => MISSING.to_string(),
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        writeln!(out, "== Weather Dashboard ==")?;
        writeln!(out, "Search: {}", self.city_input)?;
        writeln!(out, "Units: {} [{}]", self.unit, self.toggle_label)?;

        writeln!(out, "Recent searches:")?;
        if self.history.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for (i, city) in self.history.iter().enumerate() {
            writeln!(out, "  [{i}] {city}")?;
        }

        if self.loading {
            writeln!(out, "Loading...")?;
        }
        if let Some(error) = &self.error {
            writeln!(out, "Error: {error}")?;
        }

        if let Some(card) = &self.weather {
            writeln!(out)?;
            writeln!(out, "{}", card.name)?;
            writeln!(out, "{}", card.date)?;
            writeln!(out, "{}", card.description)?;
            writeln!(out, "Temperature: {}", card.temperature)?;
            writeln!(out, "Humidity: {}", card.humidity)?;
            writeln!(out, "Wind: {}", card.wind)?;
            if let Some(url) = &card.icon_url {
                writeln!(out, "Icon: {url}")?;
            }
        }

        if !self.forecast.is_empty() {
            writeln!(out)?;
            writeln!(out, "5-Day Forecast")?;
            for card in &self.forecast {
                writeln!(
                    out,
                    "  {} | {} | {} | {}",
                    card.date, card.description, card.temperature, card.humidity
                )?;
            }
        }

        f.write_str(&out)
    }
}
