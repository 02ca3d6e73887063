//! Core library for the `citywx` weather lookup client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider client behind the [`WeatherProvider`] trait
//! - Shared domain models (query, report, request state) and the error taxonomy
//! - Condition to icon mapping
//! - The [`WeatherController`] event loop with its cancellable timers
//!
//! It is used by `citywx-cli`, but can also drive other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod icon;
pub mod model;
pub mod provider;
pub mod timer;

pub use config::Config;
pub use controller::{ControllerSettings, View, WeatherController};
pub use error::{ErrorInfo, ErrorKind, WeatherError};
pub use icon::{Icon, icon_for_condition, map_condition_to_icon};
pub use model::{ConditionCategory, Query, RequestState, WeatherReport};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
