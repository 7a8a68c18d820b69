use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    model::{PostalCode, WeatherResult},
    provider::{PostalCodeResolver, TemperatureProvider, UpstreamError},
};

/// Why a lookup did not produce a [`WeatherResult`].
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("postal code is not eight digits")]
    InvalidZipcode,

    #[error("postal code lookup failed: {0}")]
    Cep(#[source] UpstreamError),

    #[error("postal code does not resolve to a city")]
    ZipcodeNotFound,

    #[error("no WeatherAPI key configured")]
    MissingApiKey,

    #[error("weather lookup failed: {0}")]
    Weather(#[source] UpstreamError),
}

impl LookupError {
    /// Message shown to API clients. Never includes the underlying cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            LookupError::InvalidZipcode => "invalid zipcode",
            LookupError::ZipcodeNotFound => "can not find zipcode",
            LookupError::MissingApiKey => "WeatherAPI key not configured",
            LookupError::Cep(e) => match e {
                UpstreamError::Unreachable(_) => "error querying CEP",
                UpstreamError::Read(_) => "error reading CEP response",
                UpstreamError::Decode(_) => "error processing CEP response",
            },
            LookupError::Weather(e) => match e {
                UpstreamError::Unreachable(_) => "error querying WeatherAPI",
                UpstreamError::Read(_) => "error reading WeatherAPI response",
                UpstreamError::Decode(_) => "error processing WeatherAPI response",
            },
        }
    }
}

/// Postal code -> city -> current temperature.
///
/// Both collaborators are called strictly in sequence and nothing is retried.
/// `weather` is `None` when no API key is configured; requests then fail after
/// the postal code has been resolved.
#[derive(Debug, Clone)]
pub struct WeatherService {
    resolver: Arc<dyn PostalCodeResolver>,
    weather: Option<Arc<dyn TemperatureProvider>>,
}

impl WeatherService {
    pub fn new(
        resolver: Arc<dyn PostalCodeResolver>,
        weather: Option<Arc<dyn TemperatureProvider>>,
    ) -> Self {
        Self { resolver, weather }
    }

    #[instrument(skip(self))]
    pub async fn lookup(&self, raw_cep: &str) -> Result<WeatherResult, LookupError> {
        let code = PostalCode::parse(raw_cep).ok_or(LookupError::InvalidZipcode)?;

        let location = self.resolver.resolve(&code).await.map_err(LookupError::Cep)?;
        if !location.is_usable() {
            return Err(LookupError::ZipcodeNotFound);
        }
        debug!(city = %location.city, "postal code resolved");

        let weather = self.weather.as_ref().ok_or(LookupError::MissingApiKey)?;
        let reading =
            weather.fetch_temperature(&location.city).await.map_err(LookupError::Weather)?;

        Ok(WeatherResult::from(reading))
    }
}
