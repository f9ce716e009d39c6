use dnssec_monitor_application::ports::LinkChecker;
use dnssec_monitor_domain::config::{KeyThresholds, ThresholdConfig};
use dnssec_monitor_domain::dnssec::format_unix;
use dnssec_monitor_domain::{
    DnskeyRecord, Finding, FindingCategory, RecordType, RrsigRecord, Severity, ZoneLink,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Classifies signature lifetimes against per key class thresholds
///
/// For each zone key the covering signatures are gathered (DNSKEY RRset for
/// a KSK, every other zone-signed RRset for a ZSK); the soonest expiration
/// decides the severity. A covering signature that is not yet valid is fatal.
pub struct ExpiryChecker {
    thresholds: ThresholdConfig,
}

impl ExpiryChecker {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn check_link(&self, link: &ZoneLink, now: i64) -> Vec<Finding> {
        let rrsets = link.zone_signed_rrsets();
        let mut findings = Vec::new();

        for key in link.keys() {
            let tag = key.calculate_key_tag();
            let is_ksk = key.is_ksk();
            let covering: Vec<&RrsigRecord> = rrsets
                .iter()
                .filter(|r| (r.record_type == RecordType::DNSKEY) == is_ksk)
                .flat_map(|r| r.signatures.iter())
                .filter(|s| Self::signed_by(s, &key, tag, &link.zone))
                .collect();

            let subject = format!("{} tag {}", key.role(), tag);
            let thresholds = self.thresholds.for_key(is_ksk);
            findings.extend(Self::classify(&link.zone, &subject, &covering, thresholds, now));
        }

        // The DS/DLV RRset is signed by the parent but gates this zone
        if let (Some(ds_set), Some(parent)) = (&link.delegation_signer, &link.parent_zone) {
            let covering: Vec<&RrsigRecord> = ds_set
                .signatures
                .iter()
                .filter(|s| s.signer_name == *parent)
                .collect();
            if !covering.is_empty() {
                let subject = format!("{} RRSIG by {}", ds_set.record_type, parent);
                findings.extend(Self::classify(
                    &link.zone,
                    &subject,
                    &covering,
                    self.thresholds.zsk,
                    now,
                ));
            }
        }

        findings
    }

    fn signed_by(rrsig: &RrsigRecord, key: &DnskeyRecord, tag: u16, zone: &str) -> bool {
        rrsig.key_tag == tag && rrsig.algorithm == key.algorithm && rrsig.signer_name == zone
    }

    fn classify(
        zone: &str,
        subject: &str,
        covering: &[&RrsigRecord],
        thresholds: KeyThresholds,
        now: i64,
    ) -> Vec<Finding> {
        let finding = |severity, message: String| {
            Finding::new(severity, FindingCategory::Expiry, zone, subject, message)
        };

        let Some(soonest) = covering.iter().map(|s| s.expiration_at(now)).min() else {
            return vec![finding(
                Severity::Info,
                "no covering signature".to_string(),
            )];
        };

        let mut findings = Vec::new();

        if let Some(inception) = covering
            .iter()
            .map(|s| s.inception_at(now))
            .filter(|&t| t > now)
            .max()
        {
            findings.push(finding(
                Severity::Fatal,
                format!("signature not yet valid (inception {})", format_unix(inception)),
            ));
        }

        let remaining = soonest - now;
        let days = remaining.div_euclid(SECONDS_PER_DAY);
        let at = format_unix(soonest);

        let expiry = if soonest < now {
            finding(
                Severity::Fatal,
                format!("signature already expired at {}", at),
            )
        } else if remaining < i64::from(thresholds.critical_days) * SECONDS_PER_DAY {
            finding(
                Severity::Critical,
                format!(
                    "signature expires in {} days at {} (critical threshold {} days)",
                    days, at, thresholds.critical_days
                ),
            )
        } else if remaining < i64::from(thresholds.warn_days) * SECONDS_PER_DAY {
            finding(
                Severity::Warning,
                format!(
                    "signature expires in {} days at {} (warn threshold {} days)",
                    days, at, thresholds.warn_days
                ),
            )
        } else {
            finding(
                Severity::Info,
                format!("signature valid for {} more days (until {})", days, at),
            )
        };
        findings.push(expiry);
        findings
    }
}

impl LinkChecker for ExpiryChecker {
    fn name(&self) -> &'static str {
        "expiry"
    }

    fn check(&self, link: &ZoneLink, now: i64) -> Vec<Finding> {
        self.check_link(link, now)
    }
}
