use thiserror::Error;

/// Failure inside a single provider pipeline.
///
/// The messages are what ends up in [`Weather::error`](crate::Weather), so
/// they never include status codes or transport details; those are logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Error communicating to backend")]
    Communication,

    #[error("Unable to decode response from backend")]
    Decode,

    #[error("Unable to determine location for provided city")]
    UnknownLocation,

    /// A step decoded fine but contained nothing usable.
    #[error("Unable to determine {0} for provided city")]
    Empty(&'static str),
}

/// Rejection of a whole request before any provider is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("No city specified. Please provide a city query parameter.")]
    NoCity,

    #[error("Backend specified is invalid or inactive: {0}")]
    InvalidBackend(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No weather backends configured")]
    NoBackendsConfigured,
}
