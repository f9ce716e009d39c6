pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use dnssec_monitor_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}

/// Enum-dispatched transport, one per query attempt
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub fn udp(server: SocketAddr, max_payload: u16) -> Self {
        Self::Udp(udp::UdpTransport::new(server, max_payload))
    }

    pub fn tcp(server: SocketAddr) -> Self {
        Self::Tcp(tcp::TcpTransport::new(server))
    }

    /// Send a DNS query via the appropriate protocol (static dispatch).
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }
}

/// Maps a socket error to the domain error the retry policy understands.
pub(crate) fn io_error(server: SocketAddr, error: std::io::Error) -> DomainError {
    DomainError::ServerUnreachable {
        server,
        reason: error.to_string(),
    }
}
