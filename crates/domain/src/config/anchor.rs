use serde::{Deserialize, Serialize};

/// Target zone and trust-anchor sources
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnchorConfig {
    /// Zone to monitor
    #[serde(default)]
    pub zone: Option<String>,

    /// Root trust-anchor file (DNSKEY or DS records for ".")
    #[serde(default)]
    pub rootkey: Option<String>,

    /// Lookaside trust-anchor file; takes precedence over `rootkey`
    #[serde(default)]
    pub dlvkey: Option<String>,
}
