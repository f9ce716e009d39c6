use super::{
    AnchorConfig, ChecksConfig, ConfigError, DnsConfig, ExitCodeConfig, LoggingConfig,
    ThresholdConfig,
};
use crate::dnssec::name;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dns: DnsConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub exit_codes: ExitCodeConfig,

    #[serde(default)]
    pub checks: ChecksConfig,

    #[serde(default)]
    pub anchor: AnchorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line; each one replaces the file value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub zone: Option<String>,
    pub rootkey: Option<String>,
    pub dlvkey: Option<String>,
    pub hints: Vec<String>,
    pub port: Option<u16>,
    pub zsk_warn: Option<u32>,
    pub zsk_critical: Option<u32>,
    pub ksk_warn: Option<u32>,
    pub ksk_critical: Option<u32>,
    pub queries: Vec<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Loads the optional TOML file, applies CLI overrides and normalizes the zone.
    ///
    /// Validation is a separate step so callers can report it distinctly.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        if let Some(zone) = config.anchor.zone.as_deref() {
            config.anchor.zone = Some(name::normalize(zone));
        }
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Err(ConfigError::FileRead {
                path: path.to_string(),
                reason: "file not found".to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(zone) = overrides.zone {
            self.anchor.zone = Some(zone);
        }
        if let Some(rootkey) = overrides.rootkey {
            self.anchor.rootkey = Some(rootkey);
        }
        if let Some(dlvkey) = overrides.dlvkey {
            self.anchor.dlvkey = Some(dlvkey);
        }
        if !overrides.hints.is_empty() {
            self.dns.hints = overrides
                .hints
                .iter()
                .flat_map(|h| h.split(','))
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }
        if let Some(port) = overrides.port {
            self.dns.port = port;
        }
        self.thresholds
            .zsk
            .override_with(overrides.zsk_warn, overrides.zsk_critical);
        self.thresholds
            .ksk
            .override_with(overrides.ksk_warn, overrides.ksk_critical);
        if !overrides.queries.is_empty() {
            self.checks.queries.extend(overrides.queries);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Target zone; only meaningful after `validate` succeeded.
    pub fn zone(&self) -> &str {
        self.anchor.zone.as_deref().unwrap_or(".")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.anchor.zone.as_deref() {
            None => {
                return Err(ConfigError::InvalidZone(
                    "no zone given (use -z)".to_string(),
                ))
            }
            Some(zone) => {
                if name::labels(zone).iter().any(|l| l.is_empty() || l.len() > 63)
                    || zone.len() > 255
                {
                    return Err(ConfigError::InvalidZone(zone.to_string()));
                }
            }
        }
        if self.anchor.rootkey.is_none() && self.anchor.dlvkey.is_none() {
            return Err(ConfigError::MissingTrustAnchor);
        }
        self.dns.validate()?;
        self.thresholds.validate()?;
        self.exit_codes.validate()?;
        self.checks.validate()?;
        self.checks.leaf_queries(self.zone())?;
        Ok(())
    }
}
