use super::name;
use super::types::{DnskeyRecord, DsRecord, RrsigRecord};
use crate::RecordType;
use tracing::debug;

/// A single resource record with canonical RDATA
///
/// The owner name is normalized and the RDATA is in the canonical form
/// used for signing (uncompressed, embedded names lower-cased).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub record_type: RecordType,
    pub class: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl ResourceRecord {
    pub fn new(name: &str, record_type: RecordType, ttl: u32, rdata: Vec<u8>) -> Self {
        Self {
            name: name::normalize(name),
            record_type,
            class: 1,
            ttl,
            rdata,
        }
    }

    /// Type covered when this record is an RRSIG
    pub fn covered_type(&self) -> Option<RecordType> {
        if self.record_type != RecordType::RRSIG || self.rdata.len() < 2 {
            return None;
        }
        Some(RecordType::from_u16(u16::from_be_bytes([
            self.rdata[0],
            self.rdata[1],
        ])))
    }
}

/// An RRset together with the RRSIGs that cover it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRrset {
    pub name: String,
    pub record_type: RecordType,
    pub class: u16,
    /// Members, unique by RDATA
    pub records: Vec<ResourceRecord>,
    pub signatures: Vec<RrsigRecord>,
}

impl SignedRrset {
    /// Gather the RRset `(name, record_type)` and its covering RRSIGs out of a
    /// response section. `None` when no member record is present.
    pub fn collect(records: &[ResourceRecord], name: &str, record_type: RecordType) -> Option<Self> {
        let owner = name::normalize(name);
        let mut members: Vec<ResourceRecord> = Vec::new();
        let mut signatures = Vec::new();

        for record in records.iter().filter(|r| r.name == owner) {
            if record.record_type == record_type {
                if !members.iter().any(|m| m.rdata == record.rdata) {
                    members.push(record.clone());
                }
            } else if record.covered_type() == Some(record_type) {
                match RrsigRecord::parse(&record.rdata) {
                    Ok(rrsig) if !signatures.contains(&rrsig) => signatures.push(rrsig),
                    Ok(_) => {}
                    Err(e) => debug!(owner = %owner, error = %e, "Skipping malformed RRSIG"),
                }
            }
        }

        let class = members.first()?.class;
        Some(Self {
            name: owner,
            record_type,
            class,
            records: members,
            signatures,
        })
    }

    /// Split a section into signed RRsets, one per owner/type, in order of
    /// first appearance.
    pub fn group(records: &[ResourceRecord]) -> Vec<Self> {
        let mut keys: Vec<(String, RecordType)> = Vec::new();
        for record in records {
            if record.record_type == RecordType::RRSIG {
                continue;
            }
            let key = (record.name.clone(), record.record_type);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        keys.into_iter()
            .filter_map(|(owner, record_type)| Self::collect(records, &owner, record_type))
            .collect()
    }

    /// Well-formed zones publish one TTL per RRset
    pub fn has_consistent_ttl(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| pair[0].ttl == pair[1].ttl)
    }

    /// DNSKEY members that parse; malformed keys are skipped
    pub fn dnskeys(&self) -> Vec<DnskeyRecord> {
        self.records
            .iter()
            .filter(|r| r.record_type == RecordType::DNSKEY)
            .filter_map(|r| match DnskeyRecord::parse(&r.rdata) {
                Ok(key) => Some(key),
                Err(e) => {
                    debug!(owner = %r.name, error = %e, "Skipping malformed DNSKEY");
                    None
                }
            })
            .collect()
    }

    /// DS or DLV members that parse
    pub fn delegation_signers(&self) -> Vec<DsRecord> {
        self.records
            .iter()
            .filter(|r| r.record_type.is_delegation_signer())
            .filter_map(|r| match DsRecord::parse(&r.rdata) {
                Ok(ds) => Some(ds),
                Err(e) => {
                    debug!(owner = %r.name, error = %e, "Skipping malformed DS");
                    None
                }
            })
            .collect()
    }
}
