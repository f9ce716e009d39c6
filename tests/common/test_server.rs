use crate::fixtures::SignedZone;
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{RecordType, ResourceRecord};
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

const NOERROR: u8 = 0;
const SERVFAIL: u8 = 2;
const NXDOMAIN: u8 = 3;

/// No hosted zone encloses the query name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNotFound(pub String);

impl fmt::Display for ZoneNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no zone hosted for {}", self.0)
    }
}

/// Sections of an authoritative reply
#[derive(Debug, Default, Clone)]
pub struct Answer {
    pub rcode: u8,
    pub answer: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

/// Every zone one mock server is authoritative for
pub struct Universe {
    zones: Vec<SignedZone>,
    failing: Vec<(String, RecordType)>,
}

impl Universe {
    pub fn new(zones: Vec<SignedZone>) -> Self {
        Self {
            zones,
            failing: Vec::new(),
        }
    }

    /// Answers SERVFAIL for `qname`/`qtype` from every zone
    pub fn servfail(mut self, qname: &str, qtype: RecordType) -> Self {
        self.failing.push((name::normalize(qname), qtype));
        self
    }

    /// Deepest hosted zone enclosing `qname`; DS is answered by the parent
    /// side of a cut.
    pub fn zone_for(&self, qname: &str, qtype: RecordType) -> Result<&SignedZone, ZoneNotFound> {
        self.zones
            .iter()
            .filter(|z| name::is_subdomain(qname, &z.name))
            .filter(|z| !(qtype == RecordType::DS && z.name == qname))
            .max_by_key(|z| name::label_count(&z.name))
            .ok_or_else(|| ZoneNotFound(qname.to_string()))
    }

    pub fn answer(&self, qname: &str, qtype: RecordType) -> Result<Answer, ZoneNotFound> {
        let qname = name::normalize(qname);
        if self.failing.iter().any(|(n, t)| *n == qname && *t == qtype) {
            return Ok(Answer {
                rcode: SERVFAIL,
                ..Answer::default()
            });
        }
        let zone = self.zone_for(&qname, qtype)?;

        let records = zone.rrset(&qname, qtype);
        if !records.is_empty() {
            let additional = match qtype {
                RecordType::NS => self.glue(&records),
                _ => Vec::new(),
            };
            return Ok(Answer {
                rcode: NOERROR,
                answer: records,
                authority: Vec::new(),
                additional,
            });
        }

        let mut authority = zone.soa();
        if zone.has_name(&qname) {
            authority.extend(zone.nodata_proof(&qname));
            Ok(Answer {
                rcode: NOERROR,
                authority,
                ..Answer::default()
            })
        } else {
            authority.extend(zone.nxdomain_proof(&qname));
            Ok(Answer {
                rcode: NXDOMAIN,
                authority,
                ..Answer::default()
            })
        }
    }

    fn glue(&self, ns_records: &[ResourceRecord]) -> Vec<ResourceRecord> {
        ns_records
            .iter()
            .filter(|r| r.record_type == RecordType::NS)
            .filter_map(|r| name::from_wire(&r.rdata).ok())
            .flat_map(|(host, _)| {
                self.zones
                    .iter()
                    .flat_map(|z| z.addresses(&host))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Wire reply to a raw query; unknown zones get SERVFAIL
    pub fn respond(&self, query: &[u8]) -> Option<Vec<u8>> {
        if query.len() < 12 {
            return None;
        }
        let (qname, name_len) = name::from_wire(&query[12..]).ok()?;
        let question_end = 12 + name_len + 4;
        let type_bytes = query.get(12 + name_len..question_end)?;
        let qtype = RecordType::from_u16(u16::from_be_bytes([type_bytes[0], type_bytes[1]]));

        let answer = self.answer(&qname, qtype).unwrap_or_else(|_| Answer {
            rcode: SERVFAIL,
            ..Answer::default()
        });

        let mut response = Vec::with_capacity(1024);
        response.extend_from_slice(&query[0..2]);
        response.push(0x84 | (query[2] & 0x01));
        response.push(answer.rcode);
        response.extend_from_slice(&[0x00, 0x01]);
        for section in [&answer.answer, &answer.authority, &answer.additional] {
            response.extend_from_slice(&(section.len() as u16).to_be_bytes());
        }
        response.extend_from_slice(&query[12..question_end]);

        for record in answer
            .answer
            .iter()
            .chain(&answer.authority)
            .chain(&answer.additional)
        {
            response.extend(name::to_wire(&record.name).ok()?);
            response.extend_from_slice(&record.record_type.to_u16().to_be_bytes());
            response.extend_from_slice(&record.class.to_be_bytes());
            response.extend_from_slice(&record.ttl.to_be_bytes());
            response.extend_from_slice(&(record.rdata.len() as u16).to_be_bytes());
            response.extend_from_slice(&record.rdata);
        }

        Some(response)
    }
}

/// Mock authoritative UDP server on 127.0.0.1
pub struct TestServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start(universe: Universe) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let counter = Arc::clone(&queries);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = universe.respond(&buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ZoneBuilder;

    fn universe() -> Universe {
        let example = ZoneBuilder::new("example.com.", 3)
            .a("alex.example.com.", [192, 0, 2, 10])
            .build();
        let com = ZoneBuilder::new("com.", 2).delegate(&example).build();
        Universe::new(vec![com, example])
    }

    #[test]
    fn test_ds_is_answered_by_parent() {
        let universe = universe();
        assert_eq!(universe.zone_for("example.com.", RecordType::DS).unwrap().name, "com.");
        assert_eq!(
            universe.zone_for("example.com.", RecordType::DNSKEY).unwrap().name,
            "example.com."
        );
    }

    #[test]
    fn test_unknown_zone() {
        assert_eq!(
            universe().zone_for("example.org.", RecordType::A).unwrap_err(),
            ZoneNotFound("example.org.".to_string())
        );
    }

    #[test]
    fn test_ns_answer_carries_glue() {
        let answer = universe().answer("example.com.", RecordType::NS).unwrap();
        assert_eq!(answer.rcode, NOERROR);
        assert_eq!(answer.answer.len(), 2);
        assert_eq!(answer.additional.len(), 1);
        assert_eq!(answer.additional[0].name, "ns1.example.com.");
    }

    #[test]
    fn test_servfail_is_per_question() {
        let universe = universe().servfail("example.com.", RecordType::DS);

        assert_eq!(universe.answer("example.com.", RecordType::DS).unwrap().rcode, SERVFAIL);
        assert_eq!(universe.answer("example.com.", RecordType::NS).unwrap().rcode, NOERROR);
    }

    #[test]
    fn test_negative_answers() {
        let universe = universe();

        let nodata = universe.answer("alex.example.com.", RecordType::AAAA).unwrap();
        assert_eq!(nodata.rcode, NOERROR);
        assert!(nodata.answer.is_empty());
        assert!(nodata.authority.iter().any(|r| r.record_type == RecordType::NSEC3));

        let nxdomain = universe.answer("nope.example.com.", RecordType::A).unwrap();
        assert_eq!(nxdomain.rcode, NXDOMAIN);
        assert!(nxdomain.authority.iter().any(|r| r.record_type == RecordType::NSEC3));
    }
}
