use super::algorithm_name;
use crate::DomainError;
use std::fmt;

/// DNSKEY Record - Public key for DNSSEC
///
/// Contains the public key used to verify RRSIG signatures.
///
/// ## Wire Format
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Flags                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Protocol (must be 3)                |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Algorithm                           |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Public Key (variable length)        |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// ## Flags
/// - Bit 7: Zone Key flag (must be 1)
/// - Bit 15: Secure Entry Point (SEP) flag (1 for KSK, 0 for ZSK)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnskeyRecord {
    /// Flags field (16 bits)
    /// - 256 (0x0100): Zone Signing Key (ZSK)
    /// - 257 (0x0101): Key Signing Key (KSK) with SEP flag
    pub flags: u16,

    /// Protocol field (must be 3 for DNSSEC)
    pub protocol: u8,

    /// Algorithm number
    pub algorithm: u8,

    /// Public key bytes
    pub public_key: Vec<u8>,
}

impl DnskeyRecord {
    /// Parse DNSKEY from wire format
    ///
    /// ## Format
    /// - 2 bytes: flags
    /// - 1 byte: protocol
    /// - 1 byte: algorithm
    /// - N bytes: public key
    pub fn parse(data: &[u8]) -> Result<Self, DomainError> {
        if data.len() < 4 {
            return Err(DomainError::InvalidDnsResponse(
                "DNSKEY record too short".into(),
            ));
        }

        let flags = u16::from_be_bytes([data[0], data[1]]);
        let protocol = data[2];
        let algorithm = data[3];
        let public_key = data[4..].to_vec();

        if protocol != 3 {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Invalid DNSKEY protocol: {} (expected 3)",
                protocol
            )));
        }

        if flags & 0x0100 == 0 {
            return Err(DomainError::InvalidDnsResponse(
                "DNSKEY Zone Key flag not set".into(),
            ));
        }

        Ok(Self {
            flags,
            protocol,
            algorithm,
            public_key,
        })
    }

    /// RDATA in wire format, as hashed for DS digests and key tags
    pub fn to_rdata(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(4 + self.public_key.len());
        wire.extend_from_slice(&self.flags.to_be_bytes());
        wire.push(self.protocol);
        wire.push(self.algorithm);
        wire.extend_from_slice(&self.public_key);
        wire
    }

    /// Check if this is a Key Signing Key (KSK)
    ///
    /// KSKs have the SEP (Secure Entry Point) flag set (bit 15).
    pub fn is_ksk(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    /// Check if this is a Zone Signing Key (ZSK)
    pub fn is_zsk(&self) -> bool {
        !self.is_ksk()
    }

    /// "KSK" or "ZSK"
    pub fn role(&self) -> &'static str {
        if self.is_ksk() {
            "KSK"
        } else {
            "ZSK"
        }
    }

    /// Calculate the key tag (RFC 4034 Appendix B)
    ///
    /// The key tag is a 16-bit identifier used to efficiently select
    /// the correct DNSKEY when verifying an RRSIG.
    ///
    /// ## Algorithm
    /// 1. Initialize accumulator to 0
    /// 2. For each byte pair in wire format:
    ///    - Add to accumulator
    /// 3. Add overflow to lower 16 bits
    /// 4. Return lower 16 bits
    pub fn calculate_key_tag(&self) -> u16 {
        let wire = self.to_rdata();

        let mut accumulator: u32 = 0;

        for chunk in wire.chunks(2) {
            if chunk.len() == 2 {
                accumulator += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
            } else {
                // Odd byte at end (left-shifted)
                accumulator += u32::from(chunk[0]) << 8;
            }
        }

        accumulator += accumulator >> 16;

        (accumulator & 0xFFFF) as u16
    }

    pub fn algorithm_name(&self) -> &'static str {
        algorithm_name(self.algorithm)
    }
}

impl fmt::Display for DnskeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DNSKEY(flags={}, algo={}, tag={}, {})",
            self.flags,
            self.algorithm_name(),
            self.calculate_key_tag(),
            self.role()
        )
    }
}
