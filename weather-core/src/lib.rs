//! Core library for the postal-code weather service.
//!
//! This crate defines:
//! - Configuration loading (defaults, TOML file, environment)
//! - The two outbound collaborators: postal code resolver and weather provider
//! - The lookup pipeline and its error taxonomy
//! - Shared domain models (postal code, city, temperature readings)
//!
//! It is used by `cep-weather-server`, but has no dependency on any HTTP server.

pub mod config;
pub mod model;
pub mod provider;
pub mod service;

pub use config::Config;
pub use model::{CityLookupResult, PostalCode, TemperatureReading, WeatherResult};
pub use provider::{PostalCodeResolver, TemperatureProvider, UpstreamError};
pub use service::{LookupError, WeatherService};
