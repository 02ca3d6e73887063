use crate::{Config, Query, WeatherError, WeatherReport, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current weather reports.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, query: &Query) -> Result<WeatherReport, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is not an error here; the provider rejects the first
/// request and that rejection is shown to the user.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    if config.api_key.is_none() {
        tracing::warn!(
            "no OpenWeather API key configured; set {} or run `citywx configure`",
            crate::config::API_KEY_ENV
        );
    }

    let provider = OpenWeatherProvider::new(
        config.api_key_or_empty().to_owned(),
        config.base_url.clone(),
        config.timeout(),
    )?;

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_accepts_missing_api_key() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_config_works_with_key() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            ..Config::default()
        };
        let provider = provider_from_config(&cfg).unwrap();
        assert!(format!("{provider:?}").contains("OpenWeatherProvider"));
    }
}
