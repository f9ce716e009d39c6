use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Message client and chain walker settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Destination port for every authoritative query (default: 53)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Hint servers used to reach the anchor zone and resolve NS names
    /// Format: "ip" or "ip:port" (e.g. "198.41.0.4", "127.0.0.1:5353")
    #[serde(default)]
    pub hints: Vec<String>,

    /// Per-attempt timeout in milliseconds (default: 2000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts per server before moving on (default: 3)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base backoff between attempts in milliseconds, doubled each retry
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Deadline for the whole chain walk in seconds (default: 60)
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Advertised EDNS0 UDP payload size (default: 4096)
    #[serde(default = "default_edns_payload")]
    pub edns_payload: u16,
}

impl DnsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Resolves hint strings to socket addresses, using `port` when none is given.
    pub fn hint_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        self.hints
            .iter()
            .map(|hint| parse_hint(hint, self.port))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hints.is_empty() {
            return Err(ConfigError::InvalidHint(
                "at least one hint server is required (use --hints)".to_string(),
            ));
        }
        self.hint_addrs()?;
        if self.retries == 0 {
            return Err(ConfigError::InvalidValue(
                "dns.retries must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 || self.deadline_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "dns.timeout_ms and dns.deadline_secs must be positive".to_string(),
            ));
        }
        if self.edns_payload < 512 {
            return Err(ConfigError::InvalidValue(format!(
                "dns.edns_payload must be at least 512, got {}",
                self.edns_payload
            )));
        }
        Ok(())
    }
}

/// Parses a hint as a bare IP (v4 or v6) or a socket address.
pub fn parse_hint(hint: &str, default_port: u16) -> Result<SocketAddr, ConfigError> {
    let hint = hint.trim();
    if let Ok(ip) = hint.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }
    hint.parse::<SocketAddr>()
        .map_err(|_| ConfigError::InvalidHint(hint.to_string()))
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            hints: Vec::new(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            deadline_secs: default_deadline_secs(),
            edns_payload: default_edns_payload(),
        }
    }
}

fn default_port() -> u16 {
    53
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    100
}

fn default_deadline_secs() -> u64 {
    60
}

fn default_edns_payload() -> u16 {
    4096
}
