//! Dashboard settings from `.env`, the environment and CLI overrides.

use std::env;
use std::time::Duration;

use chrono::Datelike;
use dotenv::dotenv;
use pitwall_core::error::CapabilityParseError;
use pitwall_core::CapabilitySet;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FIRST_YEAR: i32 = 2018;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got `{value}`")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error(transparent)]
    Panels(#[from] CapabilityParseError),
    #[error("first year {first} is after the current season {last}")]
    EmptySeasonRange { first: i32, last: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub server_url: String,
    pub timeout: Duration,
    pub capabilities: CapabilitySet,
    pub first_year: i32,
    pub last_year: i32,
    pub year: Option<String>,
    pub event: Option<String>,
    pub debug: bool,
}

impl DashboardConfig {
    /// Reads `.env` then the process environment. The last season is the
    /// current calendar year.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();
        let current_year = chrono::Local::now().year();
        Self::from_lookup(|name| env::var(name).ok(), current_year)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        current_year: i32,
    ) -> Result<Self, ConfigError> {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let server_url = value("PITWALL_SERVER_URL")
            .map_or_else(|| DEFAULT_SERVER_URL.to_string(), |url| url.trim().to_string());

        let timeout_secs = match value("PITWALL_TIMEOUT_SECS") {
            Some(raw) => parse_number(&raw, "PITWALL_TIMEOUT_SECS", "a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let capabilities = match value("PITWALL_PANELS") {
            Some(raw) => raw.parse()?,
            None => CapabilitySet::standard(),
        };

        let first_year = match value("PITWALL_FIRST_YEAR") {
            Some(raw) => parse_number(&raw, "PITWALL_FIRST_YEAR", "a year")?,
            None => DEFAULT_FIRST_YEAR,
        };
        if first_year > current_year {
            return Err(ConfigError::EmptySeasonRange {
                first: first_year,
                last: current_year,
            });
        }

        Ok(Self {
            server_url,
            timeout: Duration::from_secs(timeout_secs),
            capabilities,
            first_year,
            last_year: current_year,
            year: value("PITWALL_YEAR").map(|year| year.trim().to_string()),
            event: value("PITWALL_EVENT"),
            debug: value("DEBUG").is_some(),
        })
    }

    /// Seasons offered in the year selector, oldest first.
    pub fn years(&self) -> Vec<String> {
        (self.first_year..=self.last_year)
            .map(|year| year.to_string())
            .collect()
    }

    /// The season to open with: the requested one, else the latest.
    pub fn initial_year(&self) -> String {
        self.year
            .clone()
            .unwrap_or_else(|| self.last_year.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: &str,
    name: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pitwall_core::TrackSource;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        DashboardConfig::from_lookup(|name| vars.get(name).cloned(), 2024)
    }

    #[test]
    fn defaults_without_any_variables() -> Result<(), ConfigError> {
        let config = config_from(&[])?;

        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.capabilities, CapabilitySet::standard());
        assert_eq!(config.initial_year(), "2024");
        assert_eq!(config.years().first().map(String::as_str), Some("2018"));
        assert_eq!(config.years().len(), 7);
        assert!(!config.debug);
        Ok(())
    }

    #[test]
    fn variables_override_the_defaults() -> Result<(), ConfigError> {
        let config = config_from(&[
            ("PITWALL_SERVER_URL", "http://pitwall.local:8080/"),
            ("PITWALL_TIMEOUT_SECS", "5"),
            ("PITWALL_PANELS", "track_info,replay"),
            ("PITWALL_YEAR", "2023"),
            ("PITWALL_EVENT", "Bahrain Grand Prix"),
            ("DEBUG", "1"),
        ])?;

        assert_eq!(config.server_url, "http://pitwall.local:8080/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.capabilities.track, Some(TrackSource::Info));
        assert!(config.capabilities.replay);
        assert!(!config.capabilities.tyre_strategy);
        assert_eq!(config.initial_year(), "2023");
        assert_eq!(config.event.as_deref(), Some("Bahrain Grand Prix"));
        assert!(config.debug);
        Ok(())
    }

    #[test]
    fn blank_values_count_as_unset() -> Result<(), ConfigError> {
        let config = config_from(&[("PITWALL_YEAR", "  "), ("PITWALL_SERVER_URL", "")])?;

        assert_eq!(config.initial_year(), "2024");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        Ok(())
    }

    #[test]
    fn rejects_a_malformed_timeout() {
        let err = config_from(&[("PITWALL_TIMEOUT_SECS", "soon")]);

        assert!(matches!(
            err,
            Err(ConfigError::Invalid {
                name: "PITWALL_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn rejects_unknown_panels() {
        assert!(matches!(
            config_from(&[("PITWALL_PANELS", "telemetry")]),
            Err(ConfigError::Panels(_))
        ));
    }

    #[test]
    fn rejects_a_first_year_in_the_future() {
        assert!(matches!(
            config_from(&[("PITWALL_FIRST_YEAR", "2030")]),
            Err(ConfigError::EmptySeasonRange {
                first: 2030,
                last: 2024
            })
        ));
    }
}
