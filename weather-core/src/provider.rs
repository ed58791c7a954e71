use crate::{
    Config, Weather,
    error::BackendError,
    provider::{accuweather::AccuWeatherProvider, openweathermap::OpenWeatherMapProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod accuweather;
pub mod openweathermap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    AccuWeather,
    OpenWeatherMap,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::AccuWeather => "accuweather",
            ProviderId::OpenWeatherMap => "openweathermap",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::AccuWeather, ProviderId::OpenWeatherMap]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "accuweather" => Ok(ProviderId::AccuWeather),
            "openweathermap" => Ok(ProviderId::OpenWeatherMap),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: accuweather, openweathermap."
            )),
        }
    }
}

/// Anything that can answer "what is the weather in this city".
///
/// Implementations never fail: every error is reported through
/// [`Weather::error`] so callers can treat all providers uniformly. The
/// `source` a provider sets is its built-in name; the aggregator replaces it
/// with the name the provider is registered under.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, city: &str) -> Weather;
}

/// Construct a provider from config, or `None` when it has no usable API key.
pub fn provider_from_config(id: ProviderId, config: &Config) -> Option<Arc<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id)?.to_owned();
    let base_url = config.provider_config(id).and_then(|p| p.base_url.clone());
    let http = http_client(config.request_timeout());

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::AccuWeather => {
            let mut p = AccuWeatherProvider::new(api_key).with_http(http);
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderId::OpenWeatherMap => {
            let mut p = OpenWeatherMapProvider::new(api_key).with_http(http);
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
    };

    Some(provider)
}

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to build HTTP client, using defaults");
            Client::new()
        })
}

/// Run one pipeline step: GET `url` and decode the JSON body into `T`.
///
/// Transport failures and non-2xx statuses collapse into
/// [`BackendError::Communication`]; the detail only goes to the log.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    provider: ProviderId,
    step: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, BackendError> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|err| {
            tracing::error!(%provider, step, error = %err, "request to backend failed");
            BackendError::Communication
        })?;

    let status = res.status();
    let body = res.text().await.map_err(|err| {
        tracing::error!(%provider, step, error = %err, "failed to read backend response body");
        BackendError::Communication
    })?;

    if !status.is_success() {
        tracing::error!(
            %provider,
            step,
            status = status.as_u16(),
            body = %truncate_body(&body),
            "backend returned status code error"
        );
        return Err(BackendError::Communication);
    }

    serde_json::from_str(&body).map_err(|err| {
        tracing::error!(%provider, step, error = %err, "failed to decode backend response");
        BackendError::Decode
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
