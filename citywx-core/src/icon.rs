use serde::Serialize;

use crate::model::ConditionCategory;

/// Display icons for the condition groups the provider reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Sunny,
    Cloudy,
    Haze,
    Rainy,
    Drizzle,
    Snow,
    Thunderstorm,
}

impl Icon {
    /// Stable identifier, safe to use in JSON output and tests.
    pub fn id(&self) -> &'static str {
        match self {
            Icon::Sunny => "sunny",
            Icon::Cloudy => "cloudy",
            Icon::Haze => "haze",
            Icon::Rainy => "rainy",
            Icon::Drizzle => "drizzle",
            Icon::Snow => "snow",
            Icon::Thunderstorm => "thunderstorm",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sunny => "☀",
            Icon::Cloudy => "☁",
            Icon::Haze => "🌫",
            Icon::Rainy => "🌧",
            Icon::Drizzle => "🌦",
            Icon::Snow => "❄",
            Icon::Thunderstorm => "⛈",
        }
    }

    pub const fn all() -> &'static [Icon] {
        &[
            Icon::Sunny,
            Icon::Cloudy,
            Icon::Haze,
            Icon::Rainy,
            Icon::Drizzle,
            Icon::Snow,
            Icon::Thunderstorm,
        ]
    }
}

impl std::fmt::Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Unmapped groups (Mist, Smoke, Dust, ...) get no icon.
pub fn map_condition_to_icon(category: &ConditionCategory) -> Option<Icon> {
    match category {
        ConditionCategory::Clear => Some(Icon::Sunny),
        ConditionCategory::Clouds => Some(Icon::Cloudy),
        ConditionCategory::Haze => Some(Icon::Haze),
        ConditionCategory::Rain => Some(Icon::Rainy),
        ConditionCategory::Drizzle => Some(Icon::Drizzle),
        ConditionCategory::Snow => Some(Icon::Snow),
        ConditionCategory::Thunderstorm => Some(Icon::Thunderstorm),
        ConditionCategory::Other(_) => None,
    }
}

pub fn icon_for_condition(raw: &str) -> Option<Icon> {
    map_condition_to_icon(&ConditionCategory::from(raw))
}
