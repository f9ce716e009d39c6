//! DNSSEC Monitor Infrastructure Layer
pub mod dns;
