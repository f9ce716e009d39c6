use super::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Warn/critical day counts for one key class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyThresholds {
    /// Warn when the soonest-expiring signature has fewer days left
    pub warn_days: u32,

    /// Critical when fewer days are left; must not exceed `warn_days`
    pub critical_days: u32,
}

impl KeyThresholds {
    pub fn new(warn_days: u32, critical_days: u32) -> Self {
        Self {
            warn_days,
            critical_days,
        }
    }

    /// Applies command-line values. When only one side is given, the other
    /// one is pulled along so that `critical_days <= warn_days` still holds;
    /// giving both leaves the pair to `validate`.
    pub fn override_with(&mut self, warn_days: Option<u32>, critical_days: Option<u32>) {
        match (warn_days, critical_days) {
            (Some(warn), Some(critical)) => {
                self.warn_days = warn;
                self.critical_days = critical;
            }
            (Some(warn), None) => {
                self.warn_days = warn;
                self.critical_days = self.critical_days.min(warn);
            }
            (None, Some(critical)) => {
                self.critical_days = critical;
                self.warn_days = self.warn_days.max(critical);
            }
            (None, None) => {}
        }
    }
}

/// Expiry thresholds, independent for KSKs and ZSKs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_ksk")]
    pub ksk: KeyThresholds,

    #[serde(default = "default_zsk")]
    pub zsk: KeyThresholds,
}

impl ThresholdConfig {
    pub fn for_key(&self, is_ksk: bool) -> KeyThresholds {
        if is_ksk {
            self.ksk
        } else {
            self.zsk
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (class, t) in [("KSK", self.ksk), ("ZSK", self.zsk)] {
            if t.critical_days > t.warn_days {
                return Err(ConfigError::InvalidThresholds(format!(
                    "{} critical threshold ({} days) exceeds warn threshold ({} days)",
                    class, t.critical_days, t.warn_days
                )));
            }
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ksk: default_ksk(),
            zsk: default_zsk(),
        }
    }
}

fn default_ksk() -> KeyThresholds {
    KeyThresholds::new(30, 7)
}

fn default_zsk() -> KeyThresholds {
    KeyThresholds::new(7, 2)
}
