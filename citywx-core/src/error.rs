use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong between a submitted city and a rendered report.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// The provider answered 2xx but the body was not a weather payload.
    #[error("Unexpected response from weather provider: {0}")]
    Decode(String),

    /// Local validation: nothing to look up.
    #[error("Please enter a city name")]
    EmptyInput,

    /// The controller has been shut down.
    #[error("Weather controller is no longer running")]
    Closed,
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherError::Decode(err.to_string())
        } else {
            WeatherError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Provider,
    EmptyInput,
}

/// Display form of a [`WeatherError`], kept in the view state and printed by
/// `show --json` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl From<&WeatherError> for ErrorInfo {
    fn from(err: &WeatherError) -> Self {
        let (kind, status) = match err {
            WeatherError::Network(_) | WeatherError::Closed => (ErrorKind::Network, None),
            WeatherError::Provider { status, .. } => (ErrorKind::Provider, Some(*status)),
            WeatherError::Decode(_) => (ErrorKind::Provider, None),
            WeatherError::EmptyInput => (ErrorKind::EmptyInput, None),
        };

        ErrorInfo {
            kind,
            status,
            message: err.to_string(),
        }
    }
}

impl From<WeatherError> for ErrorInfo {
    fn from(err: WeatherError) -> Self {
        ErrorInfo::from(&err)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_keeps_status_and_raw_message() {
        let err = WeatherError::Provider {
            status: 404,
            message: "city not found".into(),
        };
        let info = ErrorInfo::from(&err);

        assert_eq!(info.kind, ErrorKind::Provider);
        assert_eq!(info.status, Some(404));
        assert_eq!(info.message, "city not found");
    }

    #[test]
    fn decode_error_is_displayed_as_provider_error() {
        let info = ErrorInfo::from(WeatherError::Decode("missing field `main`".into()));

        assert_eq!(info.kind, ErrorKind::Provider);
        assert_eq!(info.status, None);
        assert!(info.message.contains("missing field `main`"));
    }

    #[test]
    fn network_error_has_no_status() {
        let info = ErrorInfo::from(WeatherError::Network("connection refused".into()));

        assert_eq!(info.kind, ErrorKind::Network);
        assert_eq!(info.status, None);
        assert_eq!(info.to_string(), "Network error: connection refused");
    }

    #[test]
    fn empty_input_maps_to_its_own_kind() {
        let info = ErrorInfo::from(WeatherError::EmptyInput);
        assert_eq!(info.kind, ErrorKind::EmptyInput);
    }
}
