use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tracing::{info, warn};
use weather_core::{Config, TemperatureProvider, WeatherService, provider};

use crate::app::{AppState, router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cep-weather", version, about = "Current weather for a Brazilian postal code")]
pub struct Cli {
    /// Path to a TOML config file. Defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listening port; overrides `PORT` and the config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// Log output format. JSON lines on stdout by default.
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Resolve the effective configuration: file, then environment, then flags.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(port) = self.port {
            config.port = port;
        }
        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.config()?;

        let http = provider::build_http_client(config.http_timeout())
            .context("Failed to initialise outbound HTTP client")?;
        let resolver = provider::resolver_from_config(&config, http.clone());
        let weather: Option<Arc<dyn TemperatureProvider>> =
            match provider::weather_provider_from_config(&config, http) {
                Ok(weather) => Some(weather.into()),
                Err(err) => {
                    warn!("{err} Requests will fail until it is configured.");
                    None
                }
            };

        let service = WeatherService::new(Arc::from(resolver), weather);
        let app = router(AppState { service });

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind listener on {addr}"))?;

        info!(%addr, timeout_secs = config.http_timeout_secs, "server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_json_logs() {
        let cli = Cli::try_parse_from(["cep-weather"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.port, None);
    }

    #[test]
    fn port_flag_overrides_config() {
        let cli = Cli::try_parse_from(["cep-weather", "--port", "9999", "--config", "/no/such/file.toml"])
            .unwrap();
        assert_eq!(cli.port, Some(9999));
        assert!(cli.config().is_err());
    }

    #[test]
    fn text_logs_are_opt_in() {
        let cli = Cli::try_parse_from(["cep-weather", "--log-format", "text"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["cep-weather", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
