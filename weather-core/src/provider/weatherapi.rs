use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::DEFAULT_WEATHER_BASE_URL,
    model::TemperatureReading,
    provider::{UpstreamError, read_body, truncate_body},
};

use super::TemperatureProvider;

/// Current conditions from WeatherAPI.com.
#[derive(Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

// The key must not end up in logs.
impl std::fmt::Debug for WeatherApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl WeatherApiProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, base_url: DEFAULT_WEATHER_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

pub(crate) fn parse_current(body: &[u8]) -> Result<TemperatureReading, UpstreamError> {
    let parsed: WaResponse = serde_json::from_slice(body)?;
    Ok(TemperatureReading { celsius: parsed.current.temp_c })
}

#[async_trait]
impl TemperatureProvider for WeatherApiProvider {
    async fn fetch_temperature(&self, city: &str) -> Result<TemperatureReading, UpstreamError> {
        let url = format!("{}/v1/current.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(Box::new(e.without_url())))?;

        let status = res.status();
        let body = read_body(res).await?;
        debug!(city, %status, body = %truncate_body(&body), "WeatherAPI response");

        parse_current(&body)
    }
}
