pub mod client;
pub mod dnssec;
pub mod forwarding;
pub mod transport;

pub use client::MessageClient;
pub use forwarding::{DnsResponse, MessageBuilder, ResponseParser};
