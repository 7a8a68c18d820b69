use crate::{CityLookupResult, Config, PostalCode, TemperatureReading};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod viacep;
pub mod weatherapi;

pub use viacep::ViaCepResolver;
pub use weatherapi::WeatherApiProvider;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure talking to an outbound collaborator.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Transport failure: connect error, TLS error, timeout.
    #[error("request failed: {0}")]
    Unreachable(#[source] BoxError),

    #[error("failed to read response body: {0}")]
    Read(#[source] BoxError),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("No WeatherAPI key configured. Hint: set WEATHER_API_KEY.")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Resolves a postal code to the city it belongs to.
#[async_trait]
pub trait PostalCodeResolver: Send + Sync + Debug {
    async fn resolve(&self, code: &PostalCode) -> Result<CityLookupResult, UpstreamError>;
}

/// Reports the current temperature of a city.
#[async_trait]
pub trait TemperatureProvider: Send + Sync + Debug {
    async fn fetch_temperature(&self, city: &str) -> Result<TemperatureReading, UpstreamError>;
}

/// Build the shared outbound client. Certificates are always verified.
pub fn build_http_client(timeout: Duration) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(timeout)
        .use_rustls_tls()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}

pub fn resolver_from_config(config: &Config, http: Client) -> Box<dyn PostalCodeResolver> {
    Box::new(ViaCepResolver::new(http).with_base_url(&config.cep_base_url))
}

/// Construct the weather provider, failing when no API key is configured.
pub fn weather_provider_from_config(
    config: &Config,
    http: Client,
) -> Result<Box<dyn TemperatureProvider>, ProviderError> {
    let api_key = config.weather_api_key().ok_or(ProviderError::MissingApiKey)?;

    Ok(Box::new(
        WeatherApiProvider::new(api_key.to_owned(), http).with_base_url(&config.weather_base_url),
    ))
}

/// Read the whole body, mapping transport errors the way callers expect.
pub(crate) async fn read_body(res: reqwest::Response) -> Result<Vec<u8>, UpstreamError> {
    let body = res.bytes().await.map_err(|e| UpstreamError::Read(Box::new(e.without_url())))?;
    Ok(body.to_vec())
}

pub(crate) fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let http = build_http_client(Duration::from_secs(1)).unwrap();

        let err = weather_provider_from_config(&cfg, http).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
        assert!(err.to_string().contains("WEATHER_API_KEY"));
    }

    #[test]
    fn weather_provider_from_config_works_when_configured() {
        let cfg = Config { weather_api_key: Some("KEY".into()), ..Config::default() };
        let http = build_http_client(Duration::from_secs(1)).unwrap();

        assert!(weather_provider_from_config(&cfg, http).is_ok());
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body(b"short"), "short");

        let long = "x".repeat(500);
        let out = truncate_body(long.as_bytes());
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn upstream_error_keeps_cause() {
        let err = UpstreamError::Unreachable("connection refused".into());
        assert_eq!(err.to_string(), "request failed: connection refused");
    }
}
