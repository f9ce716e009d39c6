//! Deterministic Ed25519 zones for checker tests

use super::crypto::SignatureVerifier;
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{
    DnskeyRecord, DsRecord, RecordType, ResourceRecord, RrsigRecord, SignedRrset, ZoneLink,
};
use ring::signature::{Ed25519KeyPair, KeyPair};

pub const NOW: i64 = 1_750_000_000;
pub const DAY: i64 = 86_400;

pub struct TestKey {
    pair: Ed25519KeyPair,
    pub dnskey: DnskeyRecord,
}

impl TestKey {
    pub fn new(seed: u8, flags: u16) -> Self {
        let pair = Ed25519KeyPair::from_seed_unchecked(&[seed; 32]).unwrap();
        let dnskey = DnskeyRecord {
            flags,
            protocol: 3,
            algorithm: 15,
            public_key: pair.public_key().as_ref().to_vec(),
        };
        Self { pair, dnskey }
    }

    pub fn ksk(seed: u8) -> Self {
        Self::new(seed, 257)
    }

    pub fn zsk(seed: u8) -> Self {
        Self::new(seed, 256)
    }

    pub fn tag(&self) -> u16 {
        self.dnskey.calculate_key_tag()
    }

    pub fn record(&self, zone: &str) -> ResourceRecord {
        ResourceRecord::new(zone, RecordType::DNSKEY, 3600, self.dnskey.to_rdata())
    }

    pub fn ds(&self, zone: &str) -> ResourceRecord {
        let ds = DsRecord {
            key_tag: self.tag(),
            algorithm: 15,
            digest_type: 2,
            digest: SignatureVerifier.ds_digest(&self.dnskey, zone, 2).unwrap(),
        };
        ResourceRecord::new(zone, RecordType::DS, 3600, ds.to_rdata())
    }

    /// RRSIG over `records` (one RRset) valid between the two Unix times
    pub fn sign_between(
        &self,
        signer: &str,
        records: &[ResourceRecord],
        inception: i64,
        expiration: i64,
    ) -> ResourceRecord {
        let first = &records[0];
        let rrset = SignedRrset::collect(records, &first.name, first.record_type).unwrap();
        let mut rrsig = RrsigRecord {
            type_covered: first.record_type,
            algorithm: 15,
            labels: name::label_count(&first.name) as u8,
            original_ttl: first.ttl,
            signature_expiration: expiration as u32,
            signature_inception: inception as u32,
            key_tag: self.tag(),
            signer_name: name::normalize(signer),
            signature: Vec::new(),
        };
        let data = SignatureVerifier.signed_data(&rrsig, &rrset).unwrap();
        rrsig.signature = self.pair.sign(&data).as_ref().to_vec();
        ResourceRecord::new(&first.name, RecordType::RRSIG, first.ttl, rrsig.to_rdata().unwrap())
    }

    pub fn sign(&self, signer: &str, records: &[ResourceRecord]) -> ResourceRecord {
        self.sign_between(signer, records, NOW - DAY, NOW + 30 * DAY)
    }
}

/// `records` plus the given RRSIGs, collected as one RRset
pub fn rrset(records: &[ResourceRecord], signatures: &[ResourceRecord]) -> SignedRrset {
    let all: Vec<ResourceRecord> = records.iter().chain(signatures).cloned().collect();
    SignedRrset::collect(&all, &records[0].name, records[0].record_type).unwrap()
}

pub fn soa(zone: &str) -> ResourceRecord {
    let mut rdata = name::to_wire(&name::prepend("ns1", zone)).unwrap();
    rdata.extend(name::to_wire(&name::prepend("hostmaster", zone)).unwrap());
    for value in [2024_01_01u32, 7200, 3600, 1_209_600, 300] {
        rdata.extend_from_slice(&value.to_be_bytes());
    }
    ResourceRecord::new(zone, RecordType::SOA, 3600, rdata)
}

pub fn ns(zone: &str) -> ResourceRecord {
    let rdata = name::to_wire(&name::prepend("ns1", zone)).unwrap();
    ResourceRecord::new(zone, RecordType::NS, 3600, rdata)
}

/// Apex with a KSK-signed DNSKEY RRset and ZSK-signed SOA and NS
pub fn signed_zone(zone: &str, ksk: &TestKey, zsk: &TestKey) -> ZoneLink {
    let keys = [ksk.record(zone), zsk.record(zone)];
    let soa = [soa(zone)];
    let ns = [ns(zone)];

    let mut link = ZoneLink::new(zone.to_string());
    link.dnskeys = Some(rrset(&keys, &[ksk.sign(zone, &keys)]));
    link.soa = Some(rrset(&soa, &[zsk.sign(zone, &soa)]));
    link.ns = Some(rrset(&ns, &[zsk.sign(zone, &ns)]));
    link
}
