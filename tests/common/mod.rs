//! Test support for dnssec-monitor: signed zones built with deterministic
//! Ed25519 keys, a mock authoritative server hosting them, and a harness
//! running the monitor against it.

pub mod harness;
pub mod test_server;

pub use fixtures::{SignedZone, TestKey, Window, ZoneBuilder, DAY, NOW};
pub use harness::MonitorHarness;
pub use test_server::{Answer, TestServer, Universe, ZoneNotFound};
