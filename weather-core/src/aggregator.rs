use std::sync::Arc;

use futures::future::join_all;

use crate::{
    error::RequestError,
    model::{WeatherRequest, WeatherResponse},
    provider::WeatherProvider,
    registry::Registry,
};

/// Fans a single city lookup out to one or more registered providers.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<Registry>,
}

impl Aggregator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a request into one record per selected provider.
    ///
    /// Validation failures (no city, unknown provider) reject the whole
    /// request before any provider is called. Provider failures are kept as
    /// error records inside an otherwise successful response. Records follow
    /// the order of the requested names, or of the default set when none were
    /// given, and each record's `source` is the name it was selected by.
    pub async fn resolve(&self, request: &WeatherRequest) -> WeatherResponse {
        let city = request.city.trim();

        let selected = match self.select(city, &request.providers) {
            Ok(selected) => selected,
            Err(err) => {
                tracing::info!(city, error = %err, "rejected weather request");
                return WeatherResponse::rejected(city, err);
            }
        };

        tracing::debug!(city, backends = selected.len(), "querying backends");

        let lookups = selected.into_iter().map(|(name, provider)| async move {
            let mut weather = provider.get_weather(city).await;
            weather.source = name.clone();
            weather
        });
        let data = join_all(lookups).await;

        WeatherResponse {
            city: city.to_owned(),
            data,
            error: None,
        }
    }

    fn select<'a>(
        &'a self,
        city: &str,
        requested: &'a [String],
    ) -> Result<Vec<(&'a String, &'a Arc<dyn WeatherProvider>)>, RequestError> {
        if city.is_empty() {
            return Err(RequestError::NoCity);
        }

        let names = if requested.is_empty() {
            self.registry.default_names()
        } else {
            requested
        };

        names
            .iter()
            .map(|name| match self.registry.get(name) {
                Some(provider) => Ok((name, provider)),
                None => Err(RequestError::InvalidBackend(name.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Weather, provider::accuweather::AccuWeatherProvider};
    use async_trait::async_trait;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Returns a canned record after an optional delay and counts its calls.
    #[derive(Debug)]
    struct SpyProvider {
        weather: Weather,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl SpyProvider {
        fn new(source: &str, temperature: f64) -> Arc<Self> {
            Self::delayed(source, temperature, Duration::ZERO)
        }

        fn delayed(source: &str, temperature: f64, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                weather: Weather {
                    source: source.into(),
                    temperature,
                    ..Weather::default()
                },
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for SpyProvider {
        async fn get_weather(&self, _city: &str) -> Weather {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.weather.clone()
        }
    }

    fn aggregator(providers: &[(&str, Arc<SpyProvider>)]) -> Aggregator {
        let registry = Registry::from_providers(
            providers
                .iter()
                .map(|(name, p)| (*name, p.clone() as Arc<dyn WeatherProvider>)),
        )
        .unwrap();
        Aggregator::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn empty_city_is_rejected_without_calling_providers() {
        let foo = SpyProvider::new("foo", 1.0);
        let agg = aggregator(&[("foo", foo.clone())]);

        for city in ["", "   "] {
            let resp = agg
                .resolve(&WeatherRequest::new(city).with_providers(["foo"]))
                .await;

            assert_eq!(
                resp.error.as_deref(),
                Some("No city specified. Please provide a city query parameter.")
            );
            assert!(resp.data.is_empty());
        }
        assert_eq!(foo.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected_without_calling_providers() {
        let foo = SpyProvider::new("foo", 1.0);
        let agg = aggregator(&[("foo", foo.clone())]);

        let resp = agg
            .resolve(&WeatherRequest::new("paris").with_providers(["unknown"]))
            .await;

        assert_eq!(
            resp.error.as_deref(),
            Some("Backend specified is invalid or inactive: unknown")
        );
        assert_eq!(resp.city, "paris");
        assert!(resp.data.is_empty());
        assert_eq!(foo.calls(), 0);
    }

    #[tokio::test]
    async fn first_invalid_name_fails_whole_request() {
        let foo = SpyProvider::new("foo", 1.0);
        let baz = SpyProvider::new("baz", 2.0);
        let agg = aggregator(&[("foo", foo.clone()), ("baz", baz.clone())]);

        let resp = agg
            .resolve(&WeatherRequest::new("paris").with_providers(["foo", "bar", "baz", "qux"]))
            .await;

        assert_eq!(
            resp.error.as_deref(),
            Some("Backend specified is invalid or inactive: bar")
        );
        assert_eq!(foo.calls() + baz.calls(), 0);
    }

    #[tokio::test]
    async fn defaults_to_every_registered_provider() {
        let foo = SpyProvider::new("foo", 1.0);
        let bar = SpyProvider::new("bar", 2.0);
        let baz = SpyProvider::new("baz", 3.0);
        let agg = aggregator(&[("foo", foo), ("bar", bar), ("baz", baz)]);

        let resp = agg.resolve(&WeatherRequest::new(" paris ")).await;

        assert!(!resp.is_rejected());
        assert_eq!(resp.city, "paris");
        let sources: Vec<_> = resp.data.iter().map(|w| w.source.as_str()).collect();
        assert_eq!(sources, agg.registry().default_names());
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_requested_order_not_completion_order() {
        let slow = SpyProvider::delayed("slow", 1.0, Duration::from_millis(150));
        let fast = SpyProvider::new("fast", 2.0);
        let agg = aggregator(&[("slow", slow.clone()), ("fast", fast.clone())]);

        let resp = agg
            .resolve(&WeatherRequest::new("paris").with_providers(["slow", "fast"]))
            .await;

        let sources: Vec<_> = resp.data.iter().map(|w| w.source.as_str()).collect();
        assert_eq!(sources, ["slow", "fast"]);
        assert_eq!((slow.calls(), fast.calls()), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn providers_run_concurrently() {
        let a = SpyProvider::delayed("a", 1.0, Duration::from_millis(300));
        let b = SpyProvider::delayed("b", 2.0, Duration::from_millis(300));
        let agg = aggregator(&[("a", a), ("b", b)]);

        let started = tokio::time::Instant::now();
        let resp = agg.resolve(&WeatherRequest::new("paris")).await;

        // Virtual time: sequential calls would need 600ms.
        assert_eq!(resp.data.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn source_is_the_registered_name() {
        let spy = SpyProvider::new("builtin", 4.0);
        let agg = aggregator(&[("alias", spy)]);

        let resp = agg
            .resolve(&WeatherRequest::new("paris").with_providers(["alias", "alias"]))
            .await;

        let sources: Vec<_> = resp.data.iter().map(|w| w.source.as_str()).collect();
        assert_eq!(sources, ["alias", "alias"]);
    }

    #[tokio::test]
    async fn provider_error_stays_inside_its_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let ok = SpyProvider::new("ok", 7.0);
        let mut registry =
            Registry::from_providers([("ok", ok as Arc<dyn WeatherProvider>)]).unwrap();
        registry.register(
            "accuweather",
            Arc::new(AccuWeatherProvider::new("k".into()).with_base_url(server.uri())),
        );
        let agg = Aggregator::new(Arc::new(registry));

        let resp = agg
            .resolve(&WeatherRequest::new("paris").with_providers(["accuweather", "ok"]))
            .await;

        assert!(!resp.is_rejected());
        assert_eq!(
            resp.data[0],
            Weather::failed("accuweather", "Error communicating to backend")
        );
        assert_eq!(resp.data[1].temperature, 7.0);
    }

    #[tokio::test]
    async fn accuweather_registered_as_acc_end_to_end() {
        let server = MockServer::start().await;
        let routes = [
            ("/locations/v1/cities/search", r#"[{"Key":"1234"}]"#),
            (
                "/currentconditions/v1/1234",
                r#"[{"Temperature":{"Metric":{"Value":20}},"WeatherText":"Sunny"}]"#,
            ),
            (
                "/forecasts/v1/daily/1day/1234",
                r#"{"DailyForecasts":[{"Temperature":{"Minimum":{"Value":15},"Maximum":{"Value":22}}}]}"#,
            ),
        ];
        for (route, body) in routes {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
                .mount(&server)
                .await;
        }

        let provider = AccuWeatherProvider::new("key".into()).with_base_url(server.uri());
        let registry =
            Registry::from_providers([("acc", Arc::new(provider) as Arc<dyn WeatherProvider>)])
                .unwrap();
        let agg = Aggregator::new(Arc::new(registry));

        let resp = agg
            .resolve(&WeatherRequest::new("paris").with_providers(["acc"]))
            .await;

        assert_eq!(
            resp,
            WeatherResponse {
                city: "paris".into(),
                data: vec![Weather {
                    source: "acc".into(),
                    temperature: 20.0,
                    temperature_min: 15.0,
                    temperature_max: 22.0,
                    main_description: Some("Sunny".into()),
                    detailed_description: None,
                    error: None,
                }],
                error: None,
            }
        );
    }
}
