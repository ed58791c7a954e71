use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Register help text for the counters recorded by [`track_requests`].
pub fn describe_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Count of all HTTP requests");
}

/// Count every routed request by route template and method.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };
    let method = req.method().to_string();

    metrics::counter!(HTTP_REQUESTS_TOTAL, "path" => path, "method" => method).increment(1);

    next.run(req).await
}

/// Tag successful `OPTIONS /v1/weather` responses with the supported methods.
///
/// Runs outside the CORS layer, which answers every `OPTIONS` request itself.
pub async fn advertise_weather_methods(req: Request, next: Next) -> Response {
    let is_weather_options =
        req.method() == Method::OPTIONS && req.uri().path().trim_end_matches('/') == "/v1/weather";

    let mut res = next.run(req).await;
    if is_weather_options && res.status().is_success() {
        res.headers_mut()
            .insert(header::ACCEPT, HeaderValue::from_static("GET, OPTIONS"));
    }

    res
}
