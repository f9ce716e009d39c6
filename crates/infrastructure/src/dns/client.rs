use super::forwarding::{DnsResponse, MessageBuilder, ResponseParser};
use super::transport::Transport;
use dnssec_monitor_domain::config::DnsConfig;
use dnssec_monitor_domain::{DomainError, RecordType};
use hickory_proto::op::ResponseCode;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::debug;

/// Sends single questions to one authoritative server
///
/// Every attempt uses a fresh ID. Timeouts, socket errors and replies that
/// do not belong to the query are retried with linear backoff; protocol
/// errors are returned at once.
#[derive(Debug, Clone)]
pub struct MessageClient {
    timeout: Duration,
    retries: u32,
    backoff: Duration,
    edns_payload: u16,
}

impl MessageClient {
    pub fn new(timeout: Duration, retries: u32, backoff: Duration, edns_payload: u16) -> Self {
        Self {
            timeout,
            retries: retries.max(1),
            backoff,
            edns_payload,
        }
    }

    pub fn from_config(config: &DnsConfig) -> Self {
        Self::new(
            config.timeout(),
            config.retries,
            config.backoff(),
            config.edns_payload,
        )
    }

    pub async fn query(
        &self,
        domain: &str,
        record_type: RecordType,
        server: SocketAddr,
    ) -> Result<DnsResponse, DomainError> {
        let mut last_error = DomainError::QueryTimeout { server };

        for attempt in 1..=self.retries {
            match self.attempt(domain, record_type, server).await {
                Ok(response) => return Self::check_rcode(response, domain, server),
                Err(e) if e.is_transient() => {
                    debug!(
                        server = %server,
                        domain = %domain,
                        record_type = %record_type,
                        attempt = attempt,
                        error = %e,
                        "Query attempt failed"
                    );
                    last_error = e;
                    if attempt < self.retries {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn attempt(
        &self,
        domain: &str,
        record_type: RecordType,
        server: SocketAddr,
    ) -> Result<DnsResponse, DomainError> {
        let start = Instant::now();
        let (id, query_bytes) =
            MessageBuilder::build_query_with_id(domain, &record_type, self.edns_payload)?;

        let udp = Transport::udp(server, self.edns_payload);
        let transport_response = udp.send(&query_bytes, self.timeout).await?;
        let response = ResponseParser::parse(&transport_response.bytes)?;
        Self::check_identity(&response, id, domain, record_type, server)?;

        if !response.truncated {
            return Ok(response);
        }

        debug!(
            server = %server,
            domain = %domain,
            "Response truncated (TC bit), retrying via TCP"
        );

        let remaining = self
            .timeout
            .checked_sub(start.elapsed())
            .unwrap_or(Duration::from_millis(500));

        let tcp = Transport::tcp(server);
        let tcp_response = tcp.send(&query_bytes, remaining).await?;
        let response = ResponseParser::parse(&tcp_response.bytes)?;
        Self::check_identity(&response, id, domain, record_type, server)?;
        Ok(response)
    }

    /// A reply must carry the query ID and echo the question
    fn check_identity(
        response: &DnsResponse,
        id: u16,
        domain: &str,
        record_type: RecordType,
        server: SocketAddr,
    ) -> Result<(), DomainError> {
        if response.id != id || !response.matches_question(domain, record_type) {
            debug!(
                server = %server,
                expected_id = id,
                received_id = response.id,
                "Discarding reply that does not match the query"
            );
            return Err(DomainError::QueryTimeout { server });
        }
        Ok(())
    }

    fn check_rcode(
        response: DnsResponse,
        domain: &str,
        server: SocketAddr,
    ) -> Result<DnsResponse, DomainError> {
        match response.rcode {
            ResponseCode::NoError | ResponseCode::NXDomain => Ok(response),
            ResponseCode::ServFail => Err(DomainError::ServerFailure {
                server,
                name: domain.to_string(),
            }),
            rcode => Err(DomainError::InvalidDnsResponse(format!(
                "{} answered {} for {}",
                server,
                ResponseParser::rcode_to_status(rcode),
                domain
            ))),
        }
    }
}
