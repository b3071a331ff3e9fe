//! Loosely-typed provider responses
//!
//! The provider owns its schema, so reports wrap the raw JSON and expose
//! optional lookups for the handful of fields the dashboard reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Icon CDN template; `{}` is replaced by the report's icon code
pub const ICON_URL_TEMPLATE: &str = "https://openweathermap.org/img/wn/{}@2x.png";

/// Substring selecting the midday reading of each forecast day
pub const MIDDAY_MARKER: &str = "12:00:00";

/// Response received but not in the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("weather response is missing cod 200")]
    WeatherStatus,

    #[error("forecast response is missing cod \"200\"")]
    ForecastStatus,

    #[error("forecast response has no entries")]
    EmptyForecast,

    #[error("forecast response has no midday readings")]
    NoMiddayReadings,
}

/// Build the icon URL for a provider icon code
pub fn icon_url(code: &str) -> String {
    ICON_URL_TEMPLATE.replace("{}", code)
}

/// Current-weather report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherReport(Value);

/// One entry of the provider's forecast `list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastEntry(Value);

impl WeatherReport {
    /// Accept a current-weather body only if it carries numeric `cod` 200
    /// and no `error` field.
    pub fn validate(body: Value) -> Result<Self, ValidationError> {
        if body.get("error").is_some() || body.get("cod").and_then(Value::as_f64) != Some(200.0) {
            return Err(ValidationError::WeatherStatus);
        }
        Ok(Self(body))
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        first_condition(&self.0, "description")
    }

    pub fn icon(&self) -> Option<&str> {
        first_condition(&self.0, "icon")
    }

    pub fn icon_url(&self) -> Option<String> {
        self.icon().map(icon_url)
    }

    pub fn temp(&self) -> Option<f64> {
        nested_f64(&self.0, "main", "temp")
    }

    pub fn humidity(&self) -> Option<f64> {
        nested_f64(&self.0, "main", "humidity")
    }

    pub fn wind_speed(&self) -> Option<f64> {
        nested_f64(&self.0, "wind", "speed")
    }
}

impl ForecastEntry {
    /// Validate a forecast body and keep only its midday readings, in the
    /// order the provider returned them.
    pub fn midday(body: &Value) -> Result<Vec<Self>, ValidationError> {
        if body.get("cod").and_then(Value::as_str) != Some("200") {
            return Err(ValidationError::ForecastStatus);
        }

        let list = body
            .get("list")
            .and_then(Value::as_array)
            .filter(|l| !l.is_empty())
            .ok_or(ValidationError::EmptyForecast)?;

        let daily = filter_midday(list);
        if daily.is_empty() {
            return Err(ValidationError::NoMiddayReadings);
        }
        Ok(daily)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn dt_txt(&self) -> Option<&str> {
        self.0.get("dt_txt").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        first_condition(&self.0, "description")
    }

    pub fn icon(&self) -> Option<&str> {
        first_condition(&self.0, "icon")
    }

    pub fn icon_url(&self) -> Option<String> {
        self.icon().map(icon_url)
    }

    pub fn temp(&self) -> Option<f64> {
        nested_f64(&self.0, "main", "temp")
    }

    pub fn humidity(&self) -> Option<f64> {
        nested_f64(&self.0, "main", "humidity")
    }
}

/// Entries whose `dt_txt` contains the midday marker, original order kept
pub fn filter_midday(list: &[Value]) -> Vec<ForecastEntry> {
    list.iter()
        .filter(|entry| {
            entry
                .get("dt_txt")
                .and_then(Value::as_str)
                .is_some_and(|dt| dt.contains(MIDDAY_MARKER))
        })
        .cloned()
        .map(ForecastEntry)
        .collect()
}

fn first_condition<'a>(v: &'a Value, field: &str) -> Option<&'a str> {
    v.get("weather")?.get(0)?.get(field)?.as_str()
}

fn nested_f64(v: &Value, outer: &str, inner: &str) -> Option<f64> {
    v.get(outer)?.get(inner)?.as_f64()
}
