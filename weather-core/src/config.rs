use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CEP_BASE_URL: &str = "https://viacep.com.br";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherapi.com";

/// Process-wide configuration, built once at startup.
///
/// Example TOML:
/// ```toml
/// port = 8080
/// weather_api_key = "..."
/// http_timeout_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,

    /// WeatherAPI.com key. The service still starts without it.
    pub weather_api_key: Option<String>,

    /// Timeout applied to every outbound call.
    pub http_timeout_secs: u64,

    pub cep_base_url: String,
    pub weather_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            weather_api_key: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            cep_base_url: DEFAULT_CEP_BASE_URL.to_string(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load config from an optional TOML file, then apply environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_file_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                // No config directory or no file yet: defaults.
                _ => Self::default(),
            },
        };

        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Override fields from environment-style variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(port) = get("PORT") {
            self.port = port.parse().with_context(|| format!("Invalid PORT value '{port}'"))?;
        }
        if let Some(key) = get("WEATHER_API_KEY") {
            self.weather_api_key = Some(key);
        }
        if let Some(secs) = get("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = secs
                .parse()
                .with_context(|| format!("Invalid HTTP_TIMEOUT_SECS value '{secs}'"))?;
        }
        if let Some(url) = get("CEP_BASE_URL") {
            self.cep_base_url = url;
        }
        if let Some(url) = get("WEATHER_BASE_URL") {
            self.weather_base_url = url;
        }

        self.validate()
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            bail!("Invalid HTTP_TIMEOUT_SECS value '0': must be at least 1 second");
        }
        Ok(())
    }

    /// Returns the WeatherAPI key, if one is configured and non-empty.
    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather_api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cep-weather", "cep-weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.weather_api_key(), None);
        assert_eq!(cfg.http_timeout(), Duration::from_secs(300));
        assert_eq!(cfg.cep_base_url, "https://viacep.com.br");
    }

    #[test]
    fn env_overrides_defaults() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[
            ("PORT", "9090"),
            ("WEATHER_API_KEY", "secret"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("WEATHER_BASE_URL", "http://127.0.0.1:1234"),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.weather_api_key(), Some("secret"));
        assert_eq!(cfg.http_timeout_secs, 5);
        assert_eq!(cfg.weather_base_url, "http://127.0.0.1:1234");
        assert_eq!(cfg.cep_base_url, DEFAULT_CEP_BASE_URL);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[("PORT", ""), ("WEATHER_API_KEY", "  ")])).unwrap();

        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.weather_api_key(), None);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT value"));
    }

    #[test]
    fn zero_timeout_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[("HTTP_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));
    }

    #[test]
    fn zero_timeout_from_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http_timeout_secs = 0").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn blank_key_from_file_counts_as_missing() {
        let cfg = Config { weather_api_key: Some(String::new()), ..Config::default() };
        assert_eq!(cfg.weather_api_key(), None);
    }

    #[test]
    fn loads_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 3000\nweather_api_key = \"FILE_KEY\"").unwrap();

        let cfg = Config::from_file(file.path()).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.weather_api_key(), Some("FILE_KEY"));
        assert_eq!(cfg.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
