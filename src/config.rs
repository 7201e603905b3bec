use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Service configuration, read from process environment at startup.
/// A `.env` file in the working directory is honoured (see `main`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Rate provider base URL (`CURRENCY_API_URL`).
    pub api_url: String,
    /// Rate provider API key (`CURRENCY_API_KEY`).
    pub api_key: String,
    /// Secret required by the HTTP refresh trigger (`CURRENCY_REFRESH_KEY`).
    pub refresh_key: String,
    /// Directory for the embedded keyspace (`CURRENCY_DATA_DIR`).
    pub data_dir: PathBuf,
    /// HTTP listen port (`PORT`).
    pub port: u16,
    /// Allowed CORS origin (`APP_URL`).
    pub allowed_origin: String,
    /// Scheduler cadence (`REFRESH_INTERVAL_SECS`).
    pub refresh_interval: Duration,
    /// Whether the latest view rounds rates to 3 decimals (`ROUND_LATEST`).
    pub round_latest: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup, so tests never
    /// have to mutate process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("CURRENCY_API_URL").context("CURRENCY_API_URL is not set")?;
        let api_key = lookup("CURRENCY_API_KEY").context("CURRENCY_API_KEY is not set")?;
        let refresh_key =
            lookup("CURRENCY_REFRESH_KEY").context("CURRENCY_REFRESH_KEY is not set")?;

        let data_dir = lookup("CURRENCY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let port = match lookup("PORT") {
            Some(value) => value.parse().context("PORT must be a number")?,
            None => DEFAULT_PORT,
        };

        let allowed_origin = lookup("APP_URL").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        let refresh_interval = match lookup("REFRESH_INTERVAL_SECS") {
            Some(value) => Duration::from_secs(
                value
                    .parse()
                    .context("REFRESH_INTERVAL_SECS must be a number of seconds")?,
            ),
            None => Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        };

        let round_latest = match lookup("ROUND_LATEST") {
            Some(value) => value
                .parse()
                .context("ROUND_LATEST must be true or false")?,
            None => true,
        };

        debug!(?data_dir, port, "loaded configuration");
        Ok(Self {
            api_url,
            api_key,
            refresh_key,
            data_dir,
            port,
            allowed_origin,
            refresh_interval,
            round_latest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("CURRENCY_API_URL", "https://api.example.com"),
        ("CURRENCY_API_KEY", "k"),
        ("CURRENCY_REFRESH_KEY", "s"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.allowed_origin, "http://localhost:5173");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.refresh_interval, Duration::from_secs(86_400));
        assert!(config.round_latest);
    }

    #[test]
    fn test_overrides_win() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("APP_URL", "https://rates.example.com"),
            ("REFRESH_INTERVAL_SECS", "3600"),
            ("ROUND_LATEST", "false"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origin, "https://rates.example.com");
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
        assert!(!config.round_latest);
    }

    #[test]
    fn test_missing_required_variable_fails() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("CURRENCY_API_URL"));
    }

    #[test]
    fn test_bad_port_fails() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }
}
