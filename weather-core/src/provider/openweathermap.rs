use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::BackendError, model::Weather};

use super::{ProviderId, WeatherProvider, get_json};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherMapProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn fetch_current(&self, city: &str) -> Result<OwCurrentResponse, BackendError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        get_json(
            &self.http,
            ProviderId::OpenWeatherMap,
            "current weather",
            &url,
            &[
                ("q", city),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ],
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
}

fn to_weather(parsed: OwCurrentResponse) -> Result<Weather, BackendError> {
    let condition = parsed
        .weather
        .into_iter()
        .next()
        .ok_or(BackendError::Empty("conditions"))?;

    Ok(Weather {
        source: ProviderId::OpenWeatherMap.to_string(),
        temperature: parsed.main.temp,
        temperature_min: parsed.main.temp_min,
        temperature_max: parsed.main.temp_max,
        main_description: Some(condition.main),
        detailed_description: Some(condition.description),
        error: None,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn get_weather(&self, city: &str) -> Weather {
        match self.fetch_current(city).await.and_then(to_weather) {
            Ok(weather) => weather,
            Err(err) => {
                tracing::warn!(
                    provider = %ProviderId::OpenWeatherMap,
                    city,
                    error = %err,
                    "lookup failed"
                );
                Weather::failed(ProviderId::OpenWeatherMap.as_str(), err.to_string())
            }
        }
    }
}
