use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{ConditionCategory, Query, WeatherReport},
};

use super::WeatherProvider;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("citywx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        tracing::debug!(city, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("units", "metric"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| truncate_body(&body));

            tracing::warn!(city, status = status.as_u16(), %message, "OpenWeather request failed");

            return Err(WeatherError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

        Ok(parsed.into_report())
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
    visibility: Option<u32>,
}

impl OwCurrentResponse {
    fn into_report(self) -> WeatherReport {
        let observation_time = DateTime::<Utc>::from_timestamp(self.dt, 0).unwrap_or_else(Utc::now);

        let (condition, description) = match self.weather.into_iter().next() {
            Some(w) => (ConditionCategory::from(w.main.as_str()), w.description),
            None => (ConditionCategory::Other("Unknown".to_string()), String::new()),
        };

        WeatherReport {
            location_name: self.name,
            country: self.sys.country,
            condition,
            description,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            visibility_m: self.visibility,
            wind_speed_mps: self.wind.speed,
            observation_time,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, query: &Query) -> Result<WeatherReport, WeatherError> {
        self.fetch_current(query.as_str()).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISTANBUL: &str = r#"{
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 21.7, "feels_like": 21.2, "temp_min": 20.1, "temp_max": 22.9,
                 "pressure": 1015, "humidity": 52},
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 40},
        "dt": 1760702400,
        "sys": {"country": "TR", "sunrise": 1760671000, "sunset": 1760711000},
        "name": "Istanbul",
        "cod": 200
    }"#;

    #[test]
    fn current_response_maps_to_report() {
        let parsed: OwCurrentResponse = serde_json::from_str(ISTANBUL).unwrap();
        let report = parsed.into_report();

        assert_eq!(report.location_name, "Istanbul");
        assert_eq!(report.country, "TR");
        assert_eq!(report.condition, ConditionCategory::Clear);
        assert_eq!(report.description, "clear sky");
        assert_eq!(report.temperature_whole(), 21);
        assert_eq!(report.humidity_pct, 52);
        assert_eq!(report.visibility_m, Some(10000));
        assert_eq!(report.observation_time.timestamp(), 1760702400);
    }

    #[test]
    fn missing_optional_sections_default() {
        let body = r#"{
            "weather": [], "main": {"temp": 1.0, "feels_like": -2.0, "humidity": 90},
            "wind": {"speed": 0.5}, "dt": 0, "name": "Nowhere"
        }"#;
        let report = serde_json::from_str::<OwCurrentResponse>(body).unwrap().into_report();

        assert_eq!(report.country, "");
        assert_eq!(report.visibility_m, None);
        assert_eq!(report.visibility_km(), None);
        assert_eq!(report.condition, ConditionCategory::Other("Unknown".into()));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(150);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = OpenWeatherProvider::new(
            "secret".into(),
            "http://localhost/".into(),
            Duration::from_secs(1),
        )
        .unwrap();

        let debug = format!("{provider:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("http://localhost\""));
    }
}
