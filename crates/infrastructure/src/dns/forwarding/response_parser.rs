use super::record_type_map::RecordTypeMapper;
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{DomainError, RecordType, ResourceRecord};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use tracing::debug;

/// A decoded response with every record in canonical form
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,
    pub rcode: ResponseCode,
    pub truncated: bool,
    /// Echoed question: normalized name and type
    pub question: Option<(String, RecordType)>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    /// Additional section without the OPT pseudo-record
    pub additional: Vec<ResourceRecord>,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn matches_question(&self, owner: &str, record_type: RecordType) -> bool {
        match &self.question {
            Some((qname, qtype)) => *qname == name::normalize(owner) && *qtype == record_type,
            None => false,
        }
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let rcode = message.response_code();
        let truncated = message.truncated();

        let question = message.queries().first().map(|q| {
            (
                name::normalize(&q.name().to_ascii()),
                RecordTypeMapper::from_hickory(q.query_type()),
            )
        });

        let answers = Self::convert_section(message.answers())?;
        let authority = Self::convert_section(message.name_servers())?;
        let additional = Self::convert_section(message.additionals())?;

        debug!(
            rcode = ?rcode,
            answers = answers.len(),
            authority = authority.len(),
            additional = additional.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id: message.id(),
            rcode,
            truncated,
            question,
            answers,
            authority,
            additional,
        })
    }

    fn convert_section(records: &[Record]) -> Result<Vec<ResourceRecord>, DomainError> {
        let mut converted = Vec::with_capacity(records.len());
        for record in records {
            let record_type = RecordTypeMapper::from_hickory(record.record_type());
            if record_type == RecordType::OPT {
                continue;
            }
            converted.push(ResourceRecord {
                name: name::normalize(&record.name().to_ascii()),
                record_type,
                class: u16::from(record.dns_class()),
                ttl: record.ttl(),
                rdata: Self::canonical_rdata(record.data())?,
            });
        }
        Ok(converted)
    }

    /// RDATA in RFC 4034 6.2 canonical form: no compression, embedded names
    /// of the well-known types lower-cased.
    fn canonical_rdata(data: &RData) -> Result<Vec<u8>, DomainError> {
        match data {
            RData::A(a) => Ok(a.0.octets().to_vec()),
            RData::AAAA(aaaa) => Ok(aaaa.0.octets().to_vec()),
            RData::NS(ns) => Self::name_wire(&ns.0),
            RData::CNAME(cname) => Self::name_wire(&cname.0),
            RData::SOA(soa) => {
                let mut out = Self::name_wire(soa.mname())?;
                out.extend(Self::name_wire(soa.rname())?);
                out.extend_from_slice(&soa.serial().to_be_bytes());
                out.extend_from_slice(&soa.refresh().to_be_bytes());
                out.extend_from_slice(&soa.retry().to_be_bytes());
                out.extend_from_slice(&soa.expire().to_be_bytes());
                out.extend_from_slice(&soa.minimum().to_be_bytes());
                Ok(out)
            }
            RData::TXT(txt) => {
                let mut out = Vec::new();
                for chunk in txt.txt_data() {
                    out.push(chunk.len() as u8);
                    out.extend_from_slice(chunk);
                }
                Ok(out)
            }
            // DNSSEC types carry at most one name, so a fresh encoder never
            // compresses
            other => {
                let mut buf = Vec::with_capacity(256);
                let mut encoder = BinEncoder::new(&mut buf);
                other.emit(&mut encoder).map_err(|e| {
                    DomainError::InvalidDnsResponse(format!("Failed to encode RDATA: {}", e))
                })?;
                Ok(buf)
            }
        }
    }

    fn name_wire(value: &Name) -> Result<Vec<u8>, DomainError> {
        name::to_wire(&name::normalize(&value.to_ascii()))
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}
