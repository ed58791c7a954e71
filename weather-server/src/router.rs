use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers,
    middleware::{advertise_weather_methods, track_requests},
    state::AppState,
};

const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost", "http://localhost:3000"];

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]);

    let v1 = Router::new()
        .route("/weather", get(handlers::get_weather_without_city))
        .route("/weather/", get(handlers::get_weather_without_city))
        .route("/weather/{city}", get(handlers::get_weather))
        .route("/backends", get(handlers::get_backends));

    // Only `/v1` traffic is counted; scrapes of `/metrics` are not.
    Router::new()
        .nest("/v1", v1)
        .route_layer(from_fn(track_requests))
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(from_fn(advertise_weather_methods))
}
