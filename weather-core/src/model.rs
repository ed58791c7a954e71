use serde::{Deserialize, Serialize};

/// A request for the weather in one city, optionally restricted to a set of
/// providers. An empty `providers` list means "every configured provider".
#[derive(Debug, Clone, Default)]
pub struct WeatherRequest {
    pub city: String,
    pub providers: Vec<String>,
}

impl WeatherRequest {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            providers: Vec::new(),
        }
    }

    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = providers.into_iter().map(Into::into).collect();
        self
    }
}

/// Normalized weather record produced by every provider.
///
/// When `error` is set the numeric fields are zero and carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    pub temperature: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Weather {
    /// Record carrying only an error message for `source`.
    pub fn failed(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Aggregated answer for one [`WeatherRequest`].
///
/// `error` is only set when the request itself was rejected before any
/// provider ran; per-provider failures live inside `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Weather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WeatherResponse {
    pub fn rejected(city: impl Into<String>, error: impl ToString) -> Self {
        Self {
            city: city.into(),
            data: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }
}

/// Split a comma separated provider list such as `"accuweather, openweathermap"`.
pub fn parse_provider_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}
