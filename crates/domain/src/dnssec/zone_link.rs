use super::rrset::{ResourceRecord, SignedRrset};
use super::types::DnskeyRecord;
use crate::{DomainError, Finding, RecordType};
use std::fmt;
use std::net::SocketAddr;

/// A name server of a zone with one resolved address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameServer {
    pub name: String,
    pub addr: SocketAddr,
}

impl fmt::Display for NameServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.addr)
    }
}

/// A negative answer kept for the denial checker
#[derive(Debug, Clone)]
pub struct DenialEvidence {
    pub query_name: String,
    pub query_type: RecordType,
    /// NXDOMAIN (name does not exist) vs. NODATA (type does not exist)
    pub nxdomain: bool,
    /// Authority section of the negative response: SOA, NSEC3 and RRSIGs
    pub records: Vec<ResourceRecord>,
}

/// One zone of the chain of trust, read-only once the walker built it
#[derive(Debug, Clone)]
pub struct ZoneLink {
    pub zone: String,
    pub parent_zone: Option<String>,
    pub nameservers: Vec<NameServer>,
    pub dnskeys: Option<SignedRrset>,
    pub soa: Option<SignedRrset>,
    pub ns: Option<SignedRrset>,
    /// DS RRset from the parent, or DLV RRset from the lookaside registry
    pub delegation_signer: Option<SignedRrset>,
    /// Keys of the zone that signed `delegation_signer`
    pub parent_keys: Vec<DnskeyRecord>,
    pub leaf_rrsets: Vec<SignedRrset>,
    pub denials: Vec<DenialEvidence>,
    /// The trust-anchor zone (root or DLV registry)
    pub is_anchor: bool,
}

impl ZoneLink {
    pub fn new(zone: String) -> Self {
        Self {
            zone,
            parent_zone: None,
            nameservers: Vec::new(),
            dnskeys: None,
            soa: None,
            ns: None,
            delegation_signer: None,
            parent_keys: Vec::new(),
            leaf_rrsets: Vec::new(),
            denials: Vec::new(),
            is_anchor: false,
        }
    }

    pub fn keys(&self) -> Vec<DnskeyRecord> {
        self.dnskeys
            .as_ref()
            .map(SignedRrset::dnskeys)
            .unwrap_or_default()
    }

    /// RRsets expected to be signed by this zone's own keys: apex DNSKEY,
    /// SOA and NS, explicit leaf RRsets and the RRsets of negative answers.
    pub fn zone_signed_rrsets(&self) -> Vec<SignedRrset> {
        let mut rrsets: Vec<SignedRrset> = [&self.dnskeys, &self.soa, &self.ns]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        rrsets.extend(self.leaf_rrsets.iter().cloned());
        for denial in &self.denials {
            for rrset in SignedRrset::group(&denial.records) {
                if !rrsets
                    .iter()
                    .any(|r| r.name == rrset.name && r.record_type == rrset.record_type)
                {
                    rrsets.push(rrset);
                }
            }
        }
        rrsets
    }
}

/// Result of a chain walk
///
/// Completed links are kept when a later step fails, except when the
/// overall deadline expires.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub links: Vec<ZoneLink>,
    /// Broken-chain findings raised while walking
    pub findings: Vec<Finding>,
    pub failure: Option<DomainError>,
}
