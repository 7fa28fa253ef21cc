use crate::collectors::ReaderOptions;
use crate::config::provider::parse_flag;
use crate::error::ConfigError;
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding `alerts.error_rate_threshold`
pub const ENV_ERROR_RATE_THRESHOLD: &str = "ERROR_RATE_THRESHOLD";
/// Environment variable overriding `alerts.window_size`
pub const ENV_WINDOW_SIZE: &str = "WINDOW_SIZE";
/// Environment variable overriding `alerts.cooldown_seconds`
pub const ENV_ALERT_COOLDOWN_SEC: &str = "ALERT_COOLDOWN_SEC";
/// Environment variable overriding `alerts.maintenance_mode`
pub const ENV_MAINTENANCE_MODE: &str = "MAINTENANCE_MODE";
/// Environment variable overriding `notifier.webhook_url`
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

/// Largest accepted rolling window
const MAX_WINDOW_SIZE: usize = 1_000_000;

/// Longest accepted cooldown (one year)
const MAX_COOLDOWN_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Application configuration
///
/// Every section and field is optional in the TOML file; missing values take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub alerts: AlertsConfig,
    pub notifier: NotifierConfig,
    pub reader: ReaderConfig,
}

/// Alert detection settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Upstream 5xx rate, in percent, at which an alert is raised
    pub error_rate_threshold: f64,
    /// Number of recent events kept for the error-rate computation
    pub window_size: usize,
    /// Minimum seconds between two alerts of the same category
    pub cooldown_seconds: u64,
    /// Default maintenance mode when the live flag is not set
    pub maintenance_mode: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold: 2.0,
            window_size: 200,
            cooldown_seconds: 300,
            maintenance_mode: false,
        }
    }
}

/// Notification transport settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Incoming-webhook URL; alerts are logged and skipped when absent
    pub webhook_url: Option<String>,
    /// Timeout for a single delivery attempt
    pub timeout_seconds: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: 5,
        }
    }
}

/// Log tailing settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Delay between checks for the log file to appear
    pub wait_interval_ms: u64,
    /// Delay between reads when no new data is available
    pub poll_interval_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wait_interval_ms: 2000,
            poll_interval_ms: 500,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("{}={:?}: {}", key, value, e)))
}

impl Config {
    /// Load configuration: defaults or `path`, then environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, an
    /// environment value is malformed, or the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                Self::from_file(path)?
            }
            None => {
                info!("Using default configuration");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides using `lookup` to fetch values
    ///
    /// An empty webhook URL clears any configured URL.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ERROR_RATE_THRESHOLD) {
            self.alerts.error_rate_threshold = parse_env(ENV_ERROR_RATE_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_WINDOW_SIZE) {
            self.alerts.window_size = parse_env(ENV_WINDOW_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_ALERT_COOLDOWN_SEC) {
            self.alerts.cooldown_seconds = parse_env(ENV_ALERT_COOLDOWN_SEC, &value)?;
        }
        if let Some(value) = lookup(ENV_MAINTENANCE_MODE) {
            self.alerts.maintenance_mode = parse_flag(&value);
        }
        if let Some(value) = lookup(ENV_SLACK_WEBHOOK_URL) {
            let value = value.trim();
            self.notifier.webhook_url = (!value.is_empty()).then(|| value.to_string());
        }

        debug!("Configuration after overrides: {:?}", self);
        Ok(())
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.alerts.error_rate_threshold;
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(format!(
                "error_rate_threshold must be between 0 and 100, got {}",
                threshold
            )));
        }
        if self.alerts.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "window_size must be at most {}, got {}",
                MAX_WINDOW_SIZE, self.alerts.window_size
            )));
        }
        if self.alerts.cooldown_seconds > MAX_COOLDOWN_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "cooldown_seconds must be at most {}, got {}",
                MAX_COOLDOWN_SECONDS, self.alerts.cooldown_seconds
            )));
        }
        if self.notifier.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.reader.wait_interval_ms == 0 || self.reader.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "reader intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Cooldown between alerts of the same category
    pub fn cooldown(&self) -> chrono::Duration {
        let seconds = self.alerts.cooldown_seconds.min(MAX_COOLDOWN_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }

    pub fn notifier_timeout(&self) -> Duration {
        Duration::from_secs(self.notifier.timeout_seconds)
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            wait_interval: Duration::from_millis(self.reader.wait_interval_ms),
            poll_interval: Duration::from_millis(self.reader.poll_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.alerts.error_rate_threshold, 2.0);
        assert_eq!(config.alerts.window_size, 200);
        assert_eq!(config.alerts.cooldown_seconds, 300);
        assert!(!config.alerts.maintenance_mode);
        assert_eq!(config.notifier.webhook_url, None);
        assert_eq!(config.notifier_timeout(), Duration::from_secs(5));
        assert_eq!(config.reader_options(), ReaderOptions::default());
        assert_eq!(config.cooldown(), chrono::Duration::seconds(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [alerts]
            error_rate_threshold = 5.5

            [notifier]
            webhook_url = "https://hooks.example.com/T000"
            "#,
        )
        .unwrap();

        assert_eq!(config.alerts.error_rate_threshold, 5.5);
        assert_eq!(config.alerts.window_size, 200);
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/T000")
        );
        assert_eq!(config.notifier.timeout_seconds, 5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml("[alerts\nwindow_size = ");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_wrong_type_in_toml() {
        let result = Config::from_toml("[alerts]\nwindow_size = \"big\"");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[alerts]\ncooldown_seconds = 60").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.alerts.cooldown_seconds, 60);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::from_file(Path::new("/nonexistent/poolwatch.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("ERROR_RATE_THRESHOLD", "7.5"),
                ("WINDOW_SIZE", " 50 "),
                ("ALERT_COOLDOWN_SEC", "10"),
                ("MAINTENANCE_MODE", "Yes"),
                ("SLACK_WEBHOOK_URL", "https://hooks.example.com/X"),
            ]))
            .unwrap();

        assert_eq!(config.alerts.error_rate_threshold, 7.5);
        assert_eq!(config.alerts.window_size, 50);
        assert_eq!(config.alerts.cooldown_seconds, 10);
        assert!(config.alerts.maintenance_mode);
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/X")
        );
    }

    #[test]
    fn test_oversized_window_rejected() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[("WINDOW_SIZE", "100000000000000000")]))
            .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.alerts.window_size = MAX_WINDOW_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_webhook_env_clears_url() {
        let mut config = Config::from_toml("[notifier]\nwebhook_url = \"https://a\"").unwrap();
        config
            .apply_overrides(lookup_from(&[("SLACK_WEBHOOK_URL", "")]))
            .unwrap();
        assert_eq!(config.notifier.webhook_url, None);
    }

    #[test]
    fn test_malformed_env_value() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup_from(&[("WINDOW_SIZE", "lots")]));
        match result {
            Err(ConfigError::ParseError(message)) => assert!(message.contains("WINDOW_SIZE")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = Config::default();
        config.alerts.error_rate_threshold = 150.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.alerts.error_rate_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut config = Config::default();
        config.notifier.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.reader.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_excessive_cooldown_rejected() {
        let mut config = Config::default();
        config.alerts.cooldown_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_window_is_allowed() {
        let mut config = Config::default();
        config.alerts.window_size = 0;
        assert!(config.validate().is_ok());
    }
}
