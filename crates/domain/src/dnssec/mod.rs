//! DNSSEC data model: record layouts, RRsets, trust anchors and the
//! per-zone links produced by a chain walk.

pub mod name;
pub mod rrset;
pub mod trust_anchor;
pub mod types;
pub mod zone_link;

pub use rrset::{ResourceRecord, SignedRrset};
pub use trust_anchor::{AnchorKind, TrustAnchor};
pub use types::{DnskeyRecord, DsRecord, Nsec3Record, RrsigRecord};
pub use types::rrsig::{format_unix, serial_to_unix};
pub use zone_link::{DenialEvidence, NameServer, WalkOutcome, ZoneLink};
