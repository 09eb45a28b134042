//! Dashboard behaviour configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Operator-facing dashboard settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// How long a notification stays visible before it dismisses itself
    pub notification_ttl_ms: u64,
    /// Simulation host used by `connect` when none is given
    pub default_host: String,
    /// Simulation port used by `connect` when none is given
    pub default_port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            notification_ttl_ms: 5000,
            default_host: "localhost".to_string(),
            default_port: 4242,
        }
    }
}

impl DashboardConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_config_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.notification_ttl(), Duration::from_secs(5));
        assert_eq!(config.default_host, "localhost");
        assert_eq!(config.default_port, 4242);
    }
}
