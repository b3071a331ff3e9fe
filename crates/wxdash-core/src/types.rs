//! Query types for the two proxied lookups

use serde::{Deserialize, Serialize};

use crate::units::{Unit, UnitError};

/// Client input error (surfaced as 400 by the proxy)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("City or coordinates required")]
    MissingLocation,

    #[error("City is required for forecast")]
    MissingCity,

    #[error("Unit must be metric or imperial")]
    InvalidUnit(#[from] UnitError),
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Where to look up current weather
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates(Coordinates),
}

/// Current-weather lookup
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: Location,
    pub unit: Unit,
}

/// Forecast lookup (city only)
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    pub city: String,
    pub unit: Unit,
}

impl WeatherQuery {
    pub fn city(city: impl Into<String>, unit: Unit) -> Self {
        Self {
            location: Location::City(city.into()),
            unit,
        }
    }

    pub fn coordinates(coords: Coordinates, unit: Unit) -> Self {
        Self {
            location: Location::Coordinates(coords),
            unit,
        }
    }

    /// Build a query from raw request parameters.
    ///
    /// A non-blank `city` wins; otherwise both `lat` and `lon` must parse as
    /// finite numbers.
    pub fn from_params(
        city: Option<&str>,
        lat: Option<&str>,
        lon: Option<&str>,
        unit: Option<&str>,
    ) -> Result<Self, QueryError> {
        let unit = parse_unit(unit)?;

        if let Some(city) = non_blank(city) {
            return Ok(Self::city(city, unit));
        }

        match (parse_coord(lat), parse_coord(lon)) {
            (Some(lat), Some(lon)) => Ok(Self::coordinates(Coordinates { lat, lon }, unit)),
            _ => Err(QueryError::MissingLocation),
        }
    }

    /// Query parameters identifying the location (`q`, or `lat` + `lon`)
    pub fn location_params(&self) -> Vec<(&'static str, String)> {
        match &self.location {
            Location::City(city) => vec![("q", city.clone())],
            Location::Coordinates(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
        }
    }
}

impl ForecastQuery {
    pub fn new(city: impl Into<String>, unit: Unit) -> Self {
        Self {
            city: city.into(),
            unit,
        }
    }

    pub fn from_params(city: Option<&str>, unit: Option<&str>) -> Result<Self, QueryError> {
        let unit = parse_unit(unit)?;
        let city = non_blank(city).ok_or(QueryError::MissingCity)?;
        Ok(Self::new(city, unit))
    }
}

fn parse_unit(raw: Option<&str>) -> Result<Unit, QueryError> {
    match raw {
        None => Ok(Unit::default()),
        Some(s) => Ok(s.parse::<Unit>()?),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_coord(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
