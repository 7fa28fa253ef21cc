use crate::config::config::ENV_MAINTENANCE_MODE;

/// Source of settings that may change while the monitor runs
///
/// The monitor polls this once per processed line.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider {
    /// Whether alerting is currently suppressed for maintenance
    fn maintenance_mode(&self) -> bool;
}

/// Interpret a boolean setting: `1`, `true` and `yes` (any case) are true
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// Reads maintenance mode from the process environment on every call
#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    variable: String,
    default_maintenance: bool,
}

impl EnvConfigProvider {
    /// Read `MAINTENANCE_MODE`, falling back to `default_maintenance` when unset
    pub fn new(default_maintenance: bool) -> Self {
        Self::with_variable(ENV_MAINTENANCE_MODE, default_maintenance)
    }

    /// Read a differently named variable
    pub fn with_variable(variable: &str, default_maintenance: bool) -> Self {
        Self {
            variable: variable.to_string(),
            default_maintenance,
        }
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn maintenance_mode(&self) -> bool {
        match std::env::var(&self.variable) {
            Ok(value) => parse_flag(&value),
            Err(_) => self.default_maintenance,
        }
    }
}

/// Fixed settings, for embedding and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticConfigProvider {
    pub maintenance_mode: bool,
}

impl ConfigProvider for StaticConfigProvider {
    fn maintenance_mode(&self) -> bool {
        self.maintenance_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        for truthy in ["1", "true", "TRUE", "Yes", " yes "] {
            assert!(parse_flag(truthy), "{} should be true", truthy);
        }
        for falsy in ["0", "false", "no", "", "on", "enabled"] {
            assert!(!parse_flag(falsy), "{} should be false", falsy);
        }
    }

    #[test]
    fn test_env_provider_reads_live_value() {
        // Unique name so parallel tests never share the variable
        let name = "POOLWATCH_TEST_MAINTENANCE_LIVE";
        let provider = EnvConfigProvider::with_variable(name, false);

        std::env::remove_var(name);
        assert!(!provider.maintenance_mode());

        std::env::set_var(name, "true");
        assert!(provider.maintenance_mode());

        std::env::set_var(name, "false");
        assert!(!provider.maintenance_mode());

        std::env::remove_var(name);
    }

    #[test]
    fn test_env_provider_default_when_unset() {
        let name = "POOLWATCH_TEST_MAINTENANCE_UNSET";
        std::env::remove_var(name);

        assert!(EnvConfigProvider::with_variable(name, true).maintenance_mode());
        assert!(!EnvConfigProvider::with_variable(name, false).maintenance_mode());
    }

    #[test]
    fn test_static_provider() {
        assert!(StaticConfigProvider {
            maintenance_mode: true
        }
        .maintenance_mode());
        assert!(!StaticConfigProvider::default().maintenance_mode());
    }
}
