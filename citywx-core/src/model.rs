use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::{ErrorInfo, WeatherError};

/// City search term. Never empty, surrounding whitespace stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    pub fn parse(text: &str) -> Result<Self, WeatherError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Query {
    fn default() -> Self {
        Self(crate::config::DEFAULT_CITY.to_string())
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary condition group as reported in `weather[0].main`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Haze,
    Other(String),
}

impl ConditionCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionCategory::Clear => "Clear",
            ConditionCategory::Clouds => "Clouds",
            ConditionCategory::Rain => "Rain",
            ConditionCategory::Drizzle => "Drizzle",
            ConditionCategory::Snow => "Snow",
            ConditionCategory::Thunderstorm => "Thunderstorm",
            ConditionCategory::Haze => "Haze",
            ConditionCategory::Other(raw) => raw,
        }
    }
}

// Matching is exact, the provider always sends these capitalised.
impl From<&str> for ConditionCategory {
    fn from(value: &str) -> Self {
        match value {
            "Clear" => ConditionCategory::Clear,
            "Clouds" => ConditionCategory::Clouds,
            "Rain" => ConditionCategory::Rain,
            "Drizzle" => ConditionCategory::Drizzle,
            "Snow" => ConditionCategory::Snow,
            "Thunderstorm" => ConditionCategory::Thunderstorm,
            "Haze" => ConditionCategory::Haze,
            other => ConditionCategory::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConditionCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Current conditions for one location, metric units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location_name: String,
    pub country: String,
    pub condition: ConditionCategory,
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    /// Absent when the provider omits it.
    pub visibility_m: Option<u32>,
    pub wind_speed_mps: f64,
    pub observation_time: DateTime<Utc>,
}

impl WeatherReport {
    pub fn temperature_whole(&self) -> i64 {
        whole_degrees(self.temperature_c)
    }

    pub fn feels_like_whole(&self) -> i64 {
        whole_degrees(self.feels_like_c)
    }

    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility_m.map(|m| f64::from(m) / 1000.0)
    }
}

/// Drops the fractional part: 21.7 -> 21, -3.9 -> -3.
pub fn whole_degrees(celsius: f64) -> i64 {
    celsius.trunc() as i64
}

/// Fetch lifecycle for the current query.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Ready(WeatherReport),
    Failed(ErrorInfo),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    /// True once the current query has produced a report or an error.
    pub fn is_settled(&self) -> bool {
        matches!(self, RequestState::Ready(_) | RequestState::Failed(_))
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            RequestState::Ready(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_trims_and_rejects_blank_input() {
        assert_eq!(Query::parse("  Paris ").unwrap().as_str(), "Paris");
        assert!(matches!(Query::parse(""), Err(WeatherError::EmptyInput)));
        assert!(matches!(Query::parse(" \t "), Err(WeatherError::EmptyInput)));
    }

    #[test]
    fn query_accepts_arbitrary_utf8() {
        let q = Query::parse("São Paulo").unwrap();
        assert_eq!(q.to_string(), "São Paulo");
    }

    #[test]
    fn condition_parses_known_groups_and_keeps_unknown_raw() {
        assert_eq!(ConditionCategory::from("Rain"), ConditionCategory::Rain);
        assert_eq!(ConditionCategory::from("Haze"), ConditionCategory::Haze);
        assert_eq!(
            ConditionCategory::from("Mist"),
            ConditionCategory::Other("Mist".to_string())
        );
        assert_eq!(ConditionCategory::from("Mist").as_str(), "Mist");
    }

    #[test]
    fn whole_degrees_truncates_toward_zero() {
        assert_eq!(whole_degrees(21.7), 21);
        assert_eq!(whole_degrees(21.2), 21);
        assert_eq!(whole_degrees(-3.9), -3);
        assert_eq!(whole_degrees(-0.5), 0);
    }

    #[test]
    fn settled_states() {
        assert!(!RequestState::Idle.is_settled());
        assert!(!RequestState::Loading.is_settled());
        assert!(RequestState::Loading.is_loading());

        let failed = RequestState::Failed(ErrorInfo::from(WeatherError::EmptyInput));
        assert!(failed.is_settled());
        assert!(failed.report().is_none());
    }
}
