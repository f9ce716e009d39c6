//! DNSSEC Monitor Domain Layer
pub mod config;
pub mod dns_record;
pub mod dnssec;
pub mod errors;
pub mod finding;

pub use config::{CliOverrides, Config, ConfigError};
pub use dns_record::RecordType;
pub use dnssec::{
    AnchorKind, DenialEvidence, DnskeyRecord, DsRecord, NameServer, Nsec3Record,
    ResourceRecord, RrsigRecord, SignedRrset, TrustAnchor, WalkOutcome, ZoneLink,
};
pub use errors::DomainError;
pub use finding::{Finding, FindingCategory, Severity};
