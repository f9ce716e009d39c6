use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Invalid trust anchor: {0}")]
    InvalidTrustAnchor(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Query to {server} timed out")]
    QueryTimeout { server: SocketAddr },

    #[error("Server {server} unreachable: {reason}")]
    ServerUnreachable { server: SocketAddr, reason: String },

    #[error("Server {server} returned SERVFAIL for {name}")]
    ServerFailure { server: SocketAddr, name: String },

    #[error("No usable name server for {0}")]
    UnresolvableDelegation(String),

    #[error("Chain walk exceeded its deadline of {0}s")]
    WalkDeadlineExceeded(u64),
}

impl DomainError {
    /// Failures that may succeed when the same query is sent again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::QueryTimeout { .. } | DomainError::ServerUnreachable { .. }
        )
    }
}
