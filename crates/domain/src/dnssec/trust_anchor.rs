use super::types::{DnskeyRecord, DsRecord};
use std::fmt;

/// Where the chain of trust starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// Root (or any ancestor) key: the walk descends label by label
    Root,
    /// DNSSEC Lookaside Validation registry key
    Dlv,
}

impl AnchorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorKind::Root => "root",
            AnchorKind::Dlv => "dlv",
        }
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trust anchor - trusted key material for one zone
///
/// Trust anchors are pre-configured DNSKEYs (or DS digests of them) that are
/// trusted without verification. They form the root of trust.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    /// Zone the anchor belongs to (e.g., "." for root), normalized
    pub zone: String,

    pub kind: AnchorKind,

    pub keys: Vec<DnskeyRecord>,

    pub digests: Vec<DsRecord>,

    /// Description (for logging)
    pub description: String,
}

impl TrustAnchor {
    pub fn new(zone: String, kind: AnchorKind, description: String) -> Self {
        Self {
            zone,
            kind,
            keys: Vec::new(),
            digests: Vec::new(),
            description,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.digests.is_empty()
    }

    /// Check if a DNSKEY is one of the anchor keys
    ///
    /// Matches are based on:
    /// - Key tag
    /// - Algorithm
    /// - Public key bytes
    pub fn matches_key(&self, dnskey: &DnskeyRecord) -> bool {
        self.keys.iter().any(|anchor| {
            anchor.calculate_key_tag() == dnskey.calculate_key_tag()
                && anchor.algorithm == dnskey.algorithm
                && anchor.public_key == dnskey.public_key
        })
    }
}
