use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use weather_core::{WeatherRequest, WeatherResponse, parse_provider_list};

use crate::state::AppState;

/// Query parameters accepted by the weather endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    /// Comma separated backend names, e.g. `accuweather,openweathermap`.
    pub backend: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendsResponse {
    pub backends: Vec<String>,
}

/// `GET /v1/weather/{city}`
pub async fn get_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(query): Query<WeatherQuery>,
) -> (StatusCode, Json<WeatherResponse>) {
    lookup(&state, city, query).await
}

/// `GET /v1/weather` without a city segment.
pub async fn get_weather_without_city(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> (StatusCode, Json<WeatherResponse>) {
    lookup(&state, String::new(), query).await
}

/// `GET /v1/backends`
pub async fn get_backends(State(state): State<AppState>) -> Json<BackendsResponse> {
    Json(BackendsResponse {
        backends: state.aggregator.registry().names().to_vec(),
    })
}

/// `GET /metrics` in the Prometheus text format.
pub async fn get_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

async fn lookup(
    state: &AppState,
    city: String,
    query: WeatherQuery,
) -> (StatusCode, Json<WeatherResponse>) {
    let providers = query
        .backend
        .as_deref()
        .map(parse_provider_list)
        .unwrap_or_default();
    let request = WeatherRequest { city, providers };

    let response = state.aggregator.resolve(&request).await;
    let status = if response.is_rejected() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    (status, Json(response))
}
