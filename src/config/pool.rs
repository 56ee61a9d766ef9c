use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection pool timing, read from `DATABASE_POOL_*` variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PoolSettings {
    /// Seconds to wait for a free connection
    pub acquire_timeout: u64,
    /// Seconds an idle connection is kept open
    pub idle_timeout: u64,
    /// Maximum lifetime of a connection (seconds)
    pub max_lifetime: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            acquire_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 3600,
        }
    }
}

impl PoolSettings {
    pub const ENV_PREFIX: &'static str = "DATABASE_POOL_";

    pub fn load() -> Self {
        match envy::prefixed(Self::ENV_PREFIX).from_env::<PoolSettings>() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Invalid pool settings ({}), using defaults", e);
                PoolSettings::default()
            }
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime)
    }
}
