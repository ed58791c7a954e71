use std::{fmt::Write as _, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use weather_core::{
    Aggregator, Config, ProviderId, Registry, WeatherRequest, WeatherResponse, parse_provider_list,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Multi-backend weather service")]
pub struct Cli {
    /// Config file to use instead of the platform default (`.json` or `.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "accuweather" or "openweathermap".
        provider: String,
    },

    /// Show weather for a city from one or more backends.
    Show {
        city: String,

        /// Comma separated backends; all configured backends when absent.
        #[arg(long)]
        backend: Option<String>,
    },

    /// List the active backends.
    Backends,

    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { ref provider } => self.configure(provider)?,
            Command::Show { ref city, ref backend } => {
                let aggregator = self.aggregator()?;
                let providers = backend
                    .as_deref()
                    .map(parse_provider_list)
                    .unwrap_or_default();
                let request = WeatherRequest::new(city.as_str()).with_providers(providers);

                let response = aggregator.resolve(&request).await;
                if let Some(err) = &response.error {
                    bail!("{err}");
                }
                print!("{}", render(&response));
            }
            Command::Backends => {
                let aggregator = self.aggregator()?;
                for name in aggregator.registry().names() {
                    println!("{name}");
                }
            }
            Command::Serve { addr } => {
                let aggregator = self.aggregator()?;
                weather_server::run_server(addr, aggregator)
                    .await
                    .with_context(|| format!("Failed to serve on {addr}"))?;
            }
        }

        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) if path.exists() => Config::load_from(path),
            Some(_) => Ok(Config::default()),
            None => Config::load(),
        }
    }

    fn aggregator(&self) -> anyhow::Result<Aggregator> {
        if let Some(path) = self.config.as_ref().filter(|p| !p.exists()) {
            bail!("Config file not found: {}", path.display());
        }

        let config = self.load_config()?;
        let registry = Registry::configure(&config).context(
            "Cannot start without a backend.\n\
             Hint: run `weather configure <provider>` \
             (e.g. `weather configure openweathermap`) first.",
        )?;
        tracing::debug!(
            config = ?self.config,
            backends = ?registry.names(),
            timeout = ?config.request_timeout(),
            "backend registry ready"
        );

        Ok(Aggregator::new(Arc::new(registry)))
    }

    fn configure(&self, provider: &str) -> anyhow::Result<()> {
        let id = ProviderId::try_from(provider)?;
        let mut config = self.load_config()?;

        let api_key = inquire::Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .prompt()
            .context("Failed to read API key")?;

        config.upsert_provider_api_key(id, api_key.trim().to_string());

        match &self.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }

        tracing::info!(provider = %id, "API key saved");
        println!("Saved API key for {id}.");
        Ok(())
    }
}

/// Human-readable rendering of a successful response.
fn render(response: &WeatherResponse) -> String {
    let mut out = format!("Weather for {}\n", response.city);
    let width = response
        .data
        .iter()
        .map(|w| w.source.len())
        .max()
        .unwrap_or(0);

    for w in &response.data {
        let _ = match &w.error {
            Some(err) => writeln!(out, "  {:<width$}  error: {err}", w.source),
            None => writeln!(
                out,
                "  {:<width$}  {:.1}°C (min {:.1}°C, max {:.1}°C)  {}",
                w.source,
                w.temperature,
                w.temperature_min,
                w.temperature_max,
                describe(
                    w.main_description.as_deref(),
                    w.detailed_description.as_deref()
                ),
            ),
        };
    }

    out
}

fn describe(main: Option<&str>, detail: Option<&str>) -> String {
    match (main, detail) {
        (Some(m), Some(d)) if !d.eq_ignore_ascii_case(m) => format!("{m} ({d})"),
        (Some(m), _) => m.to_string(),
        (None, Some(d)) => d.to_string(),
        (None, None) => String::new(),
    }
}
