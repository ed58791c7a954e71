use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::BackendError, model::Weather};

use super::{ProviderId, WeatherProvider, get_json};

const DEFAULT_BASE_URL: &str = "https://dataservice.accuweather.com";

/// AccuWeather needs three calls per lookup: city search for a location key,
/// then current conditions and a one day forecast for that key.
#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl AccuWeatherProvider {
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

    async fn fetch(&self, city: &str) -> Result<Weather, BackendError> {
        let location_key = self.location_key(city).await?;
        let current = self.current_conditions(&location_key).await?;
        let forecast = self.one_day_forecast(&location_key).await?;

        Ok(to_weather(current, forecast))
    }

    async fn location_key(&self, city: &str) -> Result<String, BackendError> {
        let url = format!("{}/locations/v1/cities/search", self.base_url);

        let locations: Vec<AwLocation> = get_json(
            &self.http,
            ProviderId::AccuWeather,
            "city search",
            &url,
            &[("q", city), ("apikey", self.api_key.as_str())],
        )
        .await
        .map_err(|err| match err {
            BackendError::Decode => BackendError::UnknownLocation,
            other => other,
        })?;

        locations
            .into_iter()
            .next()
            .map(|loc| loc.key)
            .filter(|key| !key.is_empty())
            .ok_or(BackendError::UnknownLocation)
    }

    async fn current_conditions(&self, location_key: &str) -> Result<AwCurrent, BackendError> {
        let url = format!("{}/currentconditions/v1/{}", self.base_url, location_key);

        let conditions: Vec<AwCurrent> = get_json(
            &self.http,
            ProviderId::AccuWeather,
            "current conditions",
            &url,
            &[("apikey", self.api_key.as_str())],
        )
        .await?;

        conditions
            .into_iter()
            .next()
            .ok_or(BackendError::Empty("current conditions"))
    }

    async fn one_day_forecast(&self, location_key: &str) -> Result<AwDailyForecast, BackendError> {
        let url = format!("{}/forecasts/v1/daily/1day/{}", self.base_url, location_key);

        let forecast: AwForecastResponse = get_json(
            &self.http,
            ProviderId::AccuWeather,
            "1day forecast",
            &url,
            &[("apikey", self.api_key.as_str()), ("metric", "true")],
        )
        .await?;

        forecast
            .daily_forecasts
            .into_iter()
            .next()
            .ok_or(BackendError::Empty("forecast"))
    }
}

#[derive(Debug, Deserialize)]
struct AwLocation {
    #[serde(rename = "Key", default)]
    key: String,
}

#[derive(Debug, Deserialize)]
struct AwValue {
    #[serde(rename = "Value")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct AwMetric {
    #[serde(rename = "Metric")]
    metric: AwValue,
}

#[derive(Debug, Deserialize)]
struct AwCurrent {
    #[serde(rename = "WeatherText")]
    weather_text: String,
    #[serde(rename = "Temperature")]
    temperature: AwMetric,
}

#[derive(Debug, Deserialize)]
struct AwRange {
    #[serde(rename = "Minimum")]
    minimum: AwValue,
    #[serde(rename = "Maximum")]
    maximum: AwValue,
}

#[derive(Debug, Deserialize)]
struct AwDailyForecast {
    #[serde(rename = "Temperature")]
    temperature: AwRange,
}

#[derive(Debug, Deserialize)]
struct AwForecastResponse {
    #[serde(rename = "DailyForecasts")]
    daily_forecasts: Vec<AwDailyForecast>,
}

fn to_weather(current: AwCurrent, forecast: AwDailyForecast) -> Weather {
    Weather {
        source: ProviderId::AccuWeather.to_string(),
        temperature: current.temperature.metric.value,
        temperature_min: forecast.temperature.minimum.value,
        temperature_max: forecast.temperature.maximum.value,
        main_description: Some(current.weather_text),
        detailed_description: None,
        error: None,
    }
}

#[async_trait]
impl WeatherProvider for AccuWeatherProvider {
    async fn get_weather(&self, city: &str) -> Weather {
        match self.fetch(city).await {
            Ok(weather) => weather,
            Err(err) => {
                tracing::warn!(
                    provider = %ProviderId::AccuWeather,
                    city,
                    error = %err,
                    "lookup failed"
                );
                Weather::failed(ProviderId::AccuWeather.as_str(), err.to_string())
            }
        }
    }
}
