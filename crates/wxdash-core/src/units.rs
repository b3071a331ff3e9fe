//! Unit systems understood by the upstream provider
//!
//! The provider converts values itself; this module only names the two
//! systems and the suffixes used when displaying their values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown unit system: {0}")]
pub struct UnitError(pub String);

/// Temperature / wind-speed unit system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// °C, m/s
    #[default]
    Metric,
    /// °F, mph
    Imperial,
}

impl Unit {
    /// Value sent as the provider's `units` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    /// The other unit system
    pub fn toggle(self) -> Self {
        match self {
            Unit::Metric => Unit::Imperial,
            Unit::Imperial => Unit::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            other => Err(UnitError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_is_identity() {
        for unit in [Unit::Metric, Unit::Imperial] {
            assert_ne!(unit.toggle(), unit);
            assert_eq!(unit.toggle().toggle(), unit);
            assert_eq!(unit.toggle().toggle().as_str(), unit.as_str());
        }
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(Unit::Metric.temperature_suffix(), "°C");
        assert_eq!(Unit::Metric.speed_suffix(), "m/s");
        assert_eq!(Unit::Imperial.temperature_suffix(), "°F");
        assert_eq!(Unit::Imperial.speed_suffix(), "mph");
    }

    #[test]
    fn test_parse() {
        assert_eq!("metric".parse::<Unit>(), Ok(Unit::Metric));
        assert_eq!("imperial".parse::<Unit>(), Ok(Unit::Imperial));
        assert!("kelvin".parse::<Unit>().is_err());
        assert_eq!(Unit::default(), Unit::Metric);
    }
}
