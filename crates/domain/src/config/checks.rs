use super::errors::ConfigError;
use crate::{dnssec::name, RecordType, Severity};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Additional checks performed against the target zone
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChecksConfig {
    /// Extra queries in "name[:TYPE]" form; relative names are placed under
    /// the target zone and the type defaults to A. Absolute names may lie
    /// anywhere below the trust anchor.
    #[serde(default)]
    pub queries: Vec<String>,

    /// Query a name that should not exist and verify the NSEC3 proof
    #[serde(default = "default_true")]
    pub denial_probe: bool,

    /// Label prepended to the target zone for the denial probe
    #[serde(default = "default_probe_label")]
    pub probe_label: String,

    /// Severity of a delegation whose DS matches no child DNSKEY
    #[serde(default = "default_broken_chain_severity")]
    pub broken_chain_severity: Severity,
}

/// A parsed extra query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafQuery {
    pub name: String,
    pub record_type: RecordType,
}

impl LeafQuery {
    /// Parses "name[:TYPE]". Names without a trailing dot are relative to `zone`.
    pub fn parse(raw: &str, zone: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let (owner, rtype) = match raw.rsplit_once(':') {
            Some((owner, rtype)) => (
                owner,
                RecordType::from_str(rtype)
                    .map_err(|_| ConfigError::InvalidQuery(raw.to_string()))?,
            ),
            None => (raw, RecordType::A),
        };
        if owner.is_empty() {
            return Err(ConfigError::InvalidQuery(raw.to_string()));
        }
        let name = if owner == "@" {
            name::normalize(zone)
        } else if owner.ends_with('.') {
            name::normalize(owner)
        } else {
            name::prepend(owner, zone)
        };
        Ok(Self {
            name,
            record_type: rtype,
        })
    }
}

impl ChecksConfig {
    pub fn leaf_queries(&self, zone: &str) -> Result<Vec<LeafQuery>, ConfigError> {
        self.queries
            .iter()
            .map(|q| LeafQuery::parse(q, zone))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.denial_probe
            && (self.probe_label.is_empty()
                || self.probe_label.contains('.')
                || self.probe_label.len() > 63)
        {
            return Err(ConfigError::InvalidValue(format!(
                "checks.probe_label must be a single label, got '{}'",
                self.probe_label
            )));
        }
        if self.broken_chain_severity == Severity::Info {
            return Err(ConfigError::InvalidValue(
                "checks.broken_chain_severity must be warning, critical or fatal".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            denial_probe: true,
            probe_label: default_probe_label(),
            broken_chain_severity: default_broken_chain_severity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_probe_label() -> String {
    "dnssec-monitor-probe".to_string()
}

fn default_broken_chain_severity() -> Severity {
    Severity::Fatal
}
