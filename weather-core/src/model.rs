use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("postal code pattern is valid"));

/// A Brazilian postal code (CEP): exactly eight ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Returns `None` unless `raw` is exactly eight ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        // `\d` is Unicode-aware in the regex crate, so require ASCII as well.
        if raw.is_ascii() && POSTAL_CODE_RE.is_match(raw) {
            Some(Self(raw.to_owned()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// City a postal code resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityLookupResult {
    pub city: String,
    pub found: bool,
}

impl CityLookupResult {
    pub fn found(city: impl Into<String>) -> Self {
        Self { city: city.into(), found: true }
    }

    pub fn not_found() -> Self {
        Self { city: String::new(), found: false }
    }

    /// A result is only usable for the weather lookup when it names a city.
    pub fn is_usable(&self) -> bool {
        self.found && !self.city.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f64,
}

/// Response payload: the same reading in three scales.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub temp_C: f64,
    pub temp_F: f64,
    pub temp_K: f64,
}

impl WeatherResult {
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            temp_C: celsius,
            temp_F: celsius_to_fahrenheit(celsius),
            temp_K: celsius_to_kelvin(celsius),
        }
    }
}

impl From<TemperatureReading> for WeatherResult {
    fn from(reading: TemperatureReading) -> Self {
        Self::from_celsius(reading.celsius)
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}
