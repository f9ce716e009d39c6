use super::algorithm_name;
use crate::DomainError;
use std::fmt;

/// DS Record - Delegation Signer
///
/// Links parent zone to child zone by containing a hash of the child's DNSKEY.
/// DLV records (RFC 4431) use the same layout and are parsed with this type.
///
/// ## Wire Format
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Key Tag                             |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Algorithm                           |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Digest Type                         |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Digest (variable length)            |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// ## Digest Types
/// - 1: SHA-1
/// - 2: SHA-256
/// - 4: SHA-384
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsRecord {
    /// Key tag of the DNSKEY this DS refers to
    pub key_tag: u16,

    /// Algorithm of the DNSKEY
    pub algorithm: u8,

    pub digest_type: u8,

    /// Digest (hash) of the DNSKEY
    pub digest: Vec<u8>,
}

impl DsRecord {
    /// Parse DS from wire format
    ///
    /// ## Format
    /// - 2 bytes: key tag
    /// - 1 byte: algorithm
    /// - 1 byte: digest type
    /// - N bytes: digest
    pub fn parse(data: &[u8]) -> Result<Self, DomainError> {
        if data.len() < 4 {
            return Err(DomainError::InvalidDnsResponse(
                "DS record too short".into(),
            ));
        }

        let key_tag = u16::from_be_bytes([data[0], data[1]]);
        let algorithm = data[2];
        let digest_type = data[3];
        let digest = data[4..].to_vec();

        if let Some(expected_len) = Self::digest_len(digest_type) {
            if digest.len() != expected_len {
                return Err(DomainError::InvalidDnsResponse(format!(
                    "Invalid DS digest length: {} (expected {})",
                    digest.len(),
                    expected_len
                )));
            }
        }

        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }

    pub fn to_rdata(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(4 + self.digest.len());
        wire.extend_from_slice(&self.key_tag.to_be_bytes());
        wire.push(self.algorithm);
        wire.push(self.digest_type);
        wire.extend_from_slice(&self.digest);
        wire
    }

    /// Digest length for known digest types, `None` for unknown ones.
    pub fn digest_len(digest_type: u8) -> Option<usize> {
        match digest_type {
            1 => Some(20),
            2 => Some(32),
            4 => Some(48),
            _ => None,
        }
    }

    pub fn digest_type_name(&self) -> &'static str {
        match self.digest_type {
            1 => "SHA-1",
            2 => "SHA-256",
            4 => "SHA-384",
            _ => "Unknown",
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        algorithm_name(self.algorithm)
    }
}

impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DS(tag={}, algo={}, digest={})",
            self.key_tag,
            self.algorithm_name(),
            self.digest_type_name()
        )
    }
}
