use super::{io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dnssec_monitor_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP transport (RFC 1035 4.2.2 two-byte length framing)
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let length = u16::try_from(message_bytes.len()).map_err(|_| {
            DomainError::InvalidDnsResponse("DNS message exceeds 65535 bytes".into())
        })?;

        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| io_error(self.server_addr, e))?;

        let mut framed = Vec::with_capacity(message_bytes.len() + 2);
        framed.extend_from_slice(&length.to_be_bytes());
        framed.extend_from_slice(message_bytes);
        stream
            .write_all(&framed)
            .await
            .map_err(|e| io_error(self.server_addr, e))?;
        stream
            .flush()
            .await
            .map_err(|e| io_error(self.server_addr, e))?;

        debug!(server = %self.server_addr, bytes_sent = framed.len(), "TCP query sent");

        let mut length_buf = [0u8; 2];
        stream
            .read_exact(&mut length_buf)
            .await
            .map_err(|e| io_error(self.server_addr, e))?;
        let response_length = usize::from(u16::from_be_bytes(length_buf));

        let mut response_buf = vec![0u8; response_length];
        stream
            .read_exact(&mut response_buf)
            .await
            .map_err(|e| io_error(self.server_addr, e))?;

        debug!(
            server = %self.server_addr,
            bytes_received = response_length,
            "TCP response received"
        );

        Ok(response_buf)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::QueryTimeout {
                server: self.server_addr,
            })??;

        Ok(TransportResponse { bytes })
    }
}
