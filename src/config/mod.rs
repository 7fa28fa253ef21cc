/// Startup configuration: defaults, TOML file, environment overrides
#[allow(clippy::module_inception)]
pub mod config;

/// Live settings consulted on every processed line
pub mod provider;

pub use config::{AlertsConfig, Config, NotifierConfig, ReaderConfig};
pub use provider::{parse_flag, ConfigProvider, EnvConfigProvider, StaticConfigProvider};

#[cfg(test)]
pub use provider::MockConfigProvider;
