use super::algorithm_name;
use crate::dnssec::name;
use crate::{DomainError, RecordType};
use std::fmt;

/// RRSIG Record - Resource Record Signature
///
/// Contains the cryptographic signature of an RRset, signed by a DNSKEY.
///
/// ## Wire Format
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Type Covered                        |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Algorithm   |     Labels            |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Original TTL                        |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Signature Expiration                |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Signature Inception                 |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Key Tag                             |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Signer's Name (variable)            |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Signature (variable)                |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrsigRecord {
    /// Type of RRset covered by this signature
    pub type_covered: RecordType,

    pub algorithm: u8,

    /// Number of labels in original owner name (wildcards excluded)
    pub labels: u8,

    /// Original TTL of the RRset
    pub original_ttl: u32,

    /// Signature expiration, 32-bit serial time
    pub signature_expiration: u32,

    /// Signature inception, 32-bit serial time
    pub signature_inception: u32,

    /// Key tag of DNSKEY used to sign
    pub key_tag: u16,

    /// Name of the signer (zone apex), normalized
    pub signer_name: String,

    pub signature: Vec<u8>,
}

impl RrsigRecord {
    /// Parse RRSIG from wire format
    ///
    /// ## Format (fixed part)
    /// - 2 bytes: type covered
    /// - 1 byte: algorithm
    /// - 1 byte: labels
    /// - 4 bytes: original TTL
    /// - 4 bytes: signature expiration
    /// - 4 bytes: signature inception
    /// - 2 bytes: key tag
    /// - Variable: signer name (uncompressed)
    /// - Variable: signature
    pub fn parse(data: &[u8]) -> Result<Self, DomainError> {
        if data.len() < 18 {
            return Err(DomainError::InvalidDnsResponse(
                "RRSIG record too short".into(),
            ));
        }

        let type_covered = RecordType::from_u16(u16::from_be_bytes([data[0], data[1]]));
        let algorithm = data[2];
        let labels = data[3];
        let original_ttl = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let signature_expiration = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
        let signature_inception = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
        let key_tag = u16::from_be_bytes([data[16], data[17]]);

        let (signer_name, name_len) = name::from_wire(&data[18..])?;

        let signature_start = 18 + name_len;
        if signature_start >= data.len() {
            return Err(DomainError::InvalidDnsResponse(
                "RRSIG missing signature".into(),
            ));
        }

        Ok(Self {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            signature_expiration,
            signature_inception,
            key_tag,
            signer_name,
            signature: data[signature_start..].to_vec(),
        })
    }

    /// RRSIG RDATA with the signature field omitted, signer name in
    /// canonical form. This is the prefix of the signed data (RFC 4034 3.1.8.1).
    pub fn signed_prefix(&self) -> Result<Vec<u8>, DomainError> {
        let signer = name::to_wire(&self.signer_name)?;
        let mut data = Vec::with_capacity(18 + signer.len());
        data.extend_from_slice(&self.type_covered.to_u16().to_be_bytes());
        data.push(self.algorithm);
        data.push(self.labels);
        data.extend_from_slice(&self.original_ttl.to_be_bytes());
        data.extend_from_slice(&self.signature_expiration.to_be_bytes());
        data.extend_from_slice(&self.signature_inception.to_be_bytes());
        data.extend_from_slice(&self.key_tag.to_be_bytes());
        data.extend_from_slice(&signer);
        Ok(data)
    }

    pub fn to_rdata(&self) -> Result<Vec<u8>, DomainError> {
        let mut data = self.signed_prefix()?;
        data.extend_from_slice(&self.signature);
        Ok(data)
    }

    /// Expiration as Unix seconds, resolved against `now`
    pub fn expiration_at(&self, now: i64) -> i64 {
        serial_to_unix(self.signature_expiration, now)
    }

    /// Inception as Unix seconds, resolved against `now`
    pub fn inception_at(&self, now: i64) -> i64 {
        serial_to_unix(self.signature_inception, now)
    }

    pub fn algorithm_name(&self) -> &'static str {
        algorithm_name(self.algorithm)
    }
}

/// RRSIG times are 32-bit serial numbers (RFC 4034 section 3.1.5): pick the
/// Unix time closest to `now` with the same low 32 bits.
pub fn serial_to_unix(value: u32, now: i64) -> i64 {
    let delta = value.wrapping_sub(now as u32) as i32;
    now + i64::from(delta)
}

/// Formats Unix seconds as RFC 3339 UTC, falling back to the raw number.
pub fn format_unix(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| secs.to_string())
}

impl fmt::Display for RrsigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RRSIG({}, algo={}, tag={}, signer={})",
            self.type_covered,
            self.algorithm_name(),
            self.key_tag,
            self.signer_name
        )
    }
}
