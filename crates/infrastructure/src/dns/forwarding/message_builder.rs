//! DNS Message Builder
//!
//! Constructs DNS query messages in wire format using `hickory-proto`,
//! with an EDNS(0) OPT record advertising DNSSEC support.

use super::record_type_map::RecordTypeMapper;
use dnssec_monitor_domain::{DomainError, RecordType};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::Name;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query with a random ID and return both the ID and bytes
    ///
    /// The message carries:
    /// - RD (Recursion Desired) flag set
    /// - Single question section, class IN
    /// - EDNS(0) OPT record with the DO bit and `edns_payload` as UDP size
    pub fn build_query_with_id(
        domain: &str,
        record_type: &RecordType,
        edns_payload: u16,
    ) -> Result<(u16, Vec<u8>), DomainError> {
        let name = Name::from_str(domain).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })?;

        let hickory_type = RecordTypeMapper::to_hickory(record_type);

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(hickory_type);
        query.set_query_class(hickory_proto::rr::DNSClass::IN);

        let mut edns = Edns::new();
        edns.set_max_payload(edns_payload);
        edns.set_version(0);
        edns.set_dnssec_ok(true);

        let id = fastrand::u16(..);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);
        message.set_edns(edns);

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    /// Serialize a Message to wire format bytes
    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDomainName(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
