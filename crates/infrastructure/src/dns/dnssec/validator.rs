use super::crypto::SignatureVerifier;
use dnssec_monitor_application::ports::LinkChecker;
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{
    DnskeyRecord, DsRecord, Finding, FindingCategory, RecordType, RrsigRecord, Severity, SignedRrset,
    ZoneLink,
};
use tracing::debug;

/// Cryptographic checks of one zone link
///
/// Verifies every RRset the zone signs (apex DNSKEY, SOA, NS, leaf answers
/// and negative-answer records) with the zone's keys, the DS/DLV RRset with
/// the parent's keys, and binds every DS to a child DNSKEY. Signature
/// lifetimes are left to the expiry checker.
pub struct SignatureValidator {
    verifier: SignatureVerifier,
}

impl SignatureValidator {
    pub fn new() -> Self {
        Self {
            verifier: SignatureVerifier,
        }
    }

    pub fn validate(&self, link: &ZoneLink) -> Vec<Finding> {
        let mut findings = Vec::new();
        let keys = link.keys();

        if link.dnskeys.is_none() {
            findings.push(Finding::new(
                Severity::Critical,
                FindingCategory::Signature,
                &link.zone,
                "DNSKEY",
                "zone publishes no DNSKEY RRset",
            ));
        }

        for rrset in link.zone_signed_rrsets() {
            self.check_rrset(&link.zone, &rrset, &link.zone, &keys, &mut findings);
        }

        if let Some(ds_set) = &link.delegation_signer {
            if let Some(parent) = &link.parent_zone {
                self.check_rrset(&link.zone, ds_set, parent, &link.parent_keys, &mut findings);
            }
            self.check_ds_binding(link, ds_set, &keys, &mut findings);
        }

        debug!(zone = %link.zone, findings = findings.len(), "Signatures validated");
        findings
    }

    fn check_rrset(
        &self,
        zone: &str,
        rrset: &SignedRrset,
        expected_signer: &str,
        keys: &[DnskeyRecord],
        findings: &mut Vec<Finding>,
    ) {
        let subject = Self::subject(zone, rrset);

        if !rrset.has_consistent_ttl() {
            findings.push(Finding::new(
                Severity::Warning,
                FindingCategory::Signature,
                zone,
                &subject,
                "inconsistent TTLs in RRset",
            ));
        }

        for rrsig in &rrset.signatures {
            if !name::is_subdomain(&rrset.name, &rrsig.signer_name) {
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingCategory::Signature,
                    zone,
                    &subject,
                    format!(
                        "signer {} is not an ancestor of {}",
                        rrsig.signer_name, rrset.name
                    ),
                ));
            }
        }

        let signatures: Vec<&RrsigRecord> = rrset
            .signatures
            .iter()
            .filter(|s| s.signer_name == expected_signer)
            .collect();

        if signatures.is_empty() {
            findings.push(Finding::new(
                Severity::Critical,
                FindingCategory::Signature,
                zone,
                &subject,
                format!("RRset unsigned (no RRSIG by {})", expected_signer),
            ));
            return;
        }

        for rrsig in signatures {
            if let Some(finding) = self.check_signature(zone, &subject, rrset, rrsig, keys) {
                findings.push(finding);
            }
        }
    }

    fn check_signature(
        &self,
        zone: &str,
        subject: &str,
        rrset: &SignedRrset,
        rrsig: &RrsigRecord,
        keys: &[DnskeyRecord],
    ) -> Option<Finding> {
        let signature_subject = format!("{} tag {}", subject, rrsig.key_tag);

        let candidates: Vec<&DnskeyRecord> = keys
            .iter()
            .filter(|k| k.algorithm == rrsig.algorithm && k.calculate_key_tag() == rrsig.key_tag)
            .collect();

        if candidates.is_empty() {
            return Some(Finding::new(
                Severity::Warning,
                FindingCategory::Signature,
                zone,
                signature_subject,
                format!(
                    "orphaned signature (no DNSKEY with tag {} and algorithm {})",
                    rrsig.key_tag, rrsig.algorithm
                ),
            ));
        }

        if !SignatureVerifier::is_supported_algorithm(rrsig.algorithm) {
            return Some(Finding::new(
                Severity::Warning,
                FindingCategory::Signature,
                zone,
                signature_subject,
                format!(
                    "unsupported algorithm {} ({}), signature not checked",
                    rrsig.algorithm,
                    rrsig.algorithm_name()
                ),
            ));
        }

        let mut last_error = None;
        for key in candidates {
            match self.verifier.verify_rrsig(rrsig, key, rrset) {
                Ok(true) => return None,
                Ok(false) => {}
                Err(e) => last_error = Some(e),
            }
        }

        let message = match last_error {
            Some(e) => format!("signature invalid ({})", e),
            None => "signature invalid".to_string(),
        };
        Some(Finding::new(
            Severity::Critical,
            FindingCategory::Signature,
            zone,
            signature_subject,
            message,
        ))
    }

    /// Exactly one finding per DS (or DLV) that binds to no DNSKEY
    fn check_ds_binding(
        &self,
        link: &ZoneLink,
        ds_set: &SignedRrset,
        keys: &[DnskeyRecord],
        findings: &mut Vec<Finding>,
    ) {
        let kind = ds_set.record_type;
        let members = ds_set
            .records
            .iter()
            .filter(|r| r.record_type.is_delegation_signer());

        for record in members {
            let ds = match DsRecord::parse(&record.rdata) {
                Ok(ds) => ds,
                Err(e) => {
                    // Unparseable members can bind nothing
                    let subject = match record.rdata.get(0..2) {
                        Some(tag) => format!("{} tag {}", kind, u16::from_be_bytes([tag[0], tag[1]])),
                        None => kind.to_string(),
                    };
                    findings.push(Finding::new(
                        Severity::Critical,
                        FindingCategory::Signature,
                        &link.zone,
                        subject,
                        format!("{} does not match any DNSKEY (malformed record: {})", kind, e),
                    ));
                    continue;
                }
            };
            let subject = format!("{} tag {}", kind, ds.key_tag);

            if !SignatureVerifier::is_supported_digest(ds.digest_type) {
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingCategory::Signature,
                    &link.zone,
                    subject,
                    format!("unsupported digest type {}", ds.digest_type),
                ));
                continue;
            }

            let bound = keys
                .iter()
                .any(|key| matches!(self.verifier.verify_ds(&ds, key, &link.zone), Ok(true)));

            if !bound {
                findings.push(Finding::new(
                    Severity::Critical,
                    FindingCategory::Signature,
                    &link.zone,
                    subject,
                    format!("{} does not match any DNSKEY", kind),
                ));
            }
        }
    }

    fn subject(zone: &str, rrset: &SignedRrset) -> String {
        if rrset.name == zone || rrset.record_type == RecordType::DLV {
            format!("RRSIG {}", rrset.record_type)
        } else {
            format!("RRSIG {} {}", rrset.record_type, rrset.name)
        }
    }
}

impl Default for SignatureValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkChecker for SignatureValidator {
    fn name(&self) -> &'static str {
        "signatures"
    }

    fn check(&self, link: &ZoneLink, _now: i64) -> Vec<Finding> {
        self.validate(link)
    }
}
