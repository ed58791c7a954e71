//! Core library for the multi-backend weather service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers and their request pipelines
//! - The provider registry and the aggregator that fans requests out
//! - Shared domain models (requests, normalized records, responses)
//!
//! It is used by `weather-server` and `weather-cli`.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod registry;

pub use aggregator::Aggregator;
pub use config::{Config, ProviderConfig};
pub use error::{BackendError, RegistryError, RequestError};
pub use model::{Weather, WeatherRequest, WeatherResponse, parse_provider_list};
pub use provider::{ProviderId, WeatherProvider};
pub use registry::Registry;
