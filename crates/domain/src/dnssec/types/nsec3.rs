use crate::{DomainError, RecordType};
use std::collections::BTreeSet;

/// NSEC3 Record - hashed authenticated denial of existence (RFC 5155)
///
/// ## Wire Format
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |   Hash Alg.   |     Flags     |   Iterations  |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |  Salt Length  |     Salt (variable)           |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |  Hash Length  |  Next Hashed Owner (variable) |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |           Type Bit Maps (variable)            |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nsec3Record {
    /// 1 = SHA-1, the only defined algorithm
    pub hash_algorithm: u8,

    /// Bit 0: opt-out
    pub flags: u8,

    pub iterations: u16,

    pub salt: Vec<u8>,

    /// Raw hash of the next owner in hash order
    pub next_hashed_owner: Vec<u8>,

    pub types: BTreeSet<RecordType>,
}

impl Nsec3Record {
    pub fn parse(data: &[u8]) -> Result<Self, DomainError> {
        let truncated = || DomainError::InvalidDnsResponse("NSEC3 record truncated".into());

        if data.len() < 5 {
            return Err(truncated());
        }

        let hash_algorithm = data[0];
        let flags = data[1];
        let iterations = u16::from_be_bytes([data[2], data[3]]);
        let salt_len = data[4] as usize;
        let mut pos = 5;

        let salt = data.get(pos..pos + salt_len).ok_or_else(truncated)?.to_vec();
        pos += salt_len;

        let hash_len = *data.get(pos).ok_or_else(truncated)? as usize;
        pos += 1;
        if hash_len == 0 {
            return Err(DomainError::InvalidDnsResponse(
                "NSEC3 next hashed owner is empty".into(),
            ));
        }

        let next_hashed_owner = data.get(pos..pos + hash_len).ok_or_else(truncated)?.to_vec();
        pos += hash_len;

        let types = parse_type_bitmap(&data[pos..])?;

        Ok(Self {
            hash_algorithm,
            flags,
            iterations,
            salt,
            next_hashed_owner,
            types,
        })
    }

    pub fn is_opt_out(&self) -> bool {
        self.flags & 0x01 != 0
    }

    pub fn has_type(&self, record_type: RecordType) -> bool {
        self.types.contains(&record_type)
    }

    /// Same hash algorithm, iterations and salt
    pub fn same_parameters(&self, other: &Nsec3Record) -> bool {
        self.hash_algorithm == other.hash_algorithm
            && self.iterations == other.iterations
            && self.salt == other.salt
    }
}

/// Decode an NSEC/NSEC3 type bitmap (RFC 4034 section 4.1.2)
///
/// ```text
/// ( Window Block # | Bitmap Length | Bitmap )+
/// ```
pub fn parse_type_bitmap(data: &[u8]) -> Result<BTreeSet<RecordType>, DomainError> {
    let mut types = BTreeSet::new();
    let mut pos = 0;

    while pos < data.len() {
        if pos + 2 > data.len() {
            return Err(DomainError::InvalidDnsResponse(
                "Type bitmap window truncated".into(),
            ));
        }
        let window = u16::from(data[pos]);
        let len = data[pos + 1] as usize;
        pos += 2;

        if len == 0 || len > 32 || pos + len > data.len() {
            return Err(DomainError::InvalidDnsResponse(
                "Invalid type bitmap length".into(),
            ));
        }

        for (offset, byte) in data[pos..pos + len].iter().enumerate() {
            for bit in 0..8u16 {
                if byte & (0x80 >> bit) != 0 {
                    let number = window * 256 + (offset as u16) * 8 + bit;
                    types.insert(RecordType::from_u16(number));
                }
            }
        }
        pos += len;
    }

    Ok(types)
}
