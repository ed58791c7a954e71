//! Name → provider mapping built once at startup.
//!
//! Names are kept in lexicographic order so the default provider set and the
//! backend listing are stable across runs.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{
    Config,
    error::RegistryError,
    provider::{ProviderId, WeatherProvider, provider_from_config},
};

#[derive(Default)]
pub struct Registry {
    providers: BTreeMap<String, Arc<dyn WeatherProvider>>,
    defaults: Vec<String>,
    listing: OnceLock<Vec<String>>,
}

impl Registry {
    /// Register every built-in provider that has an API key in `config`.
    pub fn configure(config: &Config) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for id in ProviderId::all() {
            match provider_from_config(*id, config) {
                Some(provider) => {
                    tracing::info!(provider = %id, "backend configured");
                    registry.register(id.as_str(), provider);
                }
                None => tracing::debug!(provider = %id, "no API key, backend inactive"),
            }
        }

        for name in config.providers.keys() {
            if ProviderId::try_from(name.as_str()).is_err() {
                tracing::warn!(provider = %name, "ignoring unknown backend in configuration");
            }
        }

        if registry.is_empty() {
            return Err(RegistryError::NoBackendsConfigured);
        }

        Ok(registry)
    }

    /// Build a registry from already constructed providers.
    pub fn from_providers<I, S>(providers: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, Arc<dyn WeatherProvider>)>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for (name, provider) in providers {
            registry.register(name, provider);
        }

        if registry.is_empty() {
            return Err(RegistryError::NoBackendsConfigured);
        }

        Ok(registry)
    }

    /// Add or replace a provider. Refreshes the default set and drops the
    /// memoised listing.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn WeatherProvider>) {
        self.providers.insert(name.into(), provider);
        self.defaults = self.providers.keys().cloned().collect();
        self.listing = OnceLock::new();
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn WeatherProvider>> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Provider names used when a request does not name any.
    pub fn default_names(&self) -> &[String] {
        &self.defaults
    }

    /// Active provider names, computed on first call.
    pub fn names(&self) -> &[String] {
        self.listing
            .get_or_init(|| self.providers.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.defaults)
            .finish()
    }
}
