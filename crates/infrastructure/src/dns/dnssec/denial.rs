use dnssec_monitor_application::ports::LinkChecker;
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{
    DenialEvidence, DomainError, Finding, FindingCategory, Nsec3Record, RecordType, Severity,
    ZoneLink,
};
use sha1::{Digest, Sha1};
use tracing::debug;

/// NSEC3 hash of a name (RFC 5155 5): iterated SHA-1 over the lower-cased
/// wire name, salt appended at every round.
pub fn nsec3_hash(owner: &str, salt: &[u8], iterations: u16) -> Result<Vec<u8>, DomainError> {
    let wire = name::to_wire(owner)?;

    let mut hasher = Sha1::new();
    hasher.update(&wire);
    hasher.update(salt);
    let mut digest = hasher.finalize().to_vec();

    for _ in 0..iterations {
        let mut hasher = Sha1::new();
        hasher.update(&digest);
        hasher.update(salt);
        digest = hasher.finalize().to_vec();
    }

    Ok(digest)
}

/// True when `hash` falls strictly between `owner` and `next` in hash order,
/// the last record of the chain wrapping around to the first.
pub fn covers(owner: &[u8], next: &[u8], hash: &[u8]) -> bool {
    if owner < next {
        owner < hash && hash < next
    } else {
        hash > owner || hash < next
    }
}

/// One NSEC3 record of a negative answer with its decoded owner hash
struct HashedNsec3 {
    owner: String,
    owner_hash: Vec<u8>,
    record: Nsec3Record,
}

/// Verifies NSEC3 denial-of-existence proofs in negative answers
pub struct DenialChecker;

impl DenialChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check_denial(&self, zone: &str, evidence: &DenialEvidence) -> Option<Finding> {
        let subject = format!("NSEC3 {} {}", evidence.query_name, evidence.query_type);
        let failure = |message: String| {
            Some(Finding::new(
                Severity::Critical,
                FindingCategory::Denial,
                zone,
                &subject,
                message,
            ))
        };

        let chain = Self::collect(evidence);
        if chain.is_empty() {
            return failure("no NSEC3 records in negative response".to_string());
        }

        if let Some(bad) = chain.iter().find(|n| n.record.hash_algorithm != 1) {
            return failure(format!(
                "unsupported NSEC3 hash algorithm {} at {}",
                bad.record.hash_algorithm, bad.owner
            ));
        }

        if let Some(odd) = chain.iter().find(|n| !n.record.same_parameters(&chain[0].record)) {
            return failure(format!(
                "NSEC3 parameters at {} differ from those at {}",
                odd.owner, chain[0].owner
            ));
        }

        match self.prove(&chain, evidence) {
            Ok(()) => {
                debug!(
                    zone = %zone,
                    name = %evidence.query_name,
                    record_type = %evidence.query_type,
                    "Denial of existence proven"
                );
                None
            }
            Err(reason) => failure(format!("denial of existence not proven: {}", reason)),
        }
    }

    fn collect(evidence: &DenialEvidence) -> Vec<HashedNsec3> {
        evidence
            .records
            .iter()
            .filter(|r| r.record_type == RecordType::NSEC3)
            .filter_map(|r| {
                let label = name::labels(&r.name).first()?.to_ascii_lowercase();
                let owner_hash = data_encoding::BASE32_DNSSEC.decode(label.as_bytes()).ok()?;
                let record = Nsec3Record::parse(&r.rdata).ok()?;
                Some(HashedNsec3 {
                    owner: r.name.clone(),
                    owner_hash,
                    record,
                })
            })
            .collect()
    }

    fn prove(&self, chain: &[HashedNsec3], evidence: &DenialEvidence) -> Result<(), String> {
        // Every NSEC3 of a zone shares one parameter set
        let params = &chain[0].record;
        let nsec3_zone = name::parent(&chain[0].owner).unwrap_or_else(|| ".".to_string());
        let hash = |owner: &str| {
            nsec3_hash(owner, &params.salt, params.iterations).map_err(|e| e.to_string())
        };
        let matching = |h: &[u8]| chain.iter().find(|n| n.owner_hash == h);
        let covering = |h: &[u8]| {
            chain
                .iter()
                .find(|n| covers(&n.owner_hash, &n.record.next_hashed_owner, h))
        };

        let qname = &evidence.query_name;
        let qtype = evidence.query_type;

        if let Some(exact) = matching(&hash(qname)?) {
            if evidence.nxdomain {
                return Err(format!("NSEC3 matches {} in an NXDOMAIN answer", qname));
            }
            if exact.record.has_type(qtype) || exact.record.has_type(RecordType::CNAME) {
                return Err(format!("NSEC3 for {} lists {}", qname, qtype));
            }
            return Ok(());
        }

        // Closest encloser: deepest ancestor with a matching NSEC3
        let mut next_closer = qname.clone();
        let mut closest_encloser = None;
        let mut candidate = name::parent(qname);
        while let Some(ancestor) = candidate {
            if !name::is_subdomain(&ancestor, &nsec3_zone) {
                break;
            }
            if matching(&hash(&ancestor)?).is_some() {
                closest_encloser = Some(ancestor);
                break;
            }
            next_closer = ancestor.clone();
            candidate = name::parent(&ancestor);
        }

        let closest_encloser =
            closest_encloser.ok_or_else(|| format!("no closest encloser for {}", qname))?;

        let next_closer_cover = covering(&hash(&next_closer)?)
            .ok_or_else(|| format!("next closer name {} is not covered", next_closer))?;

        let wildcard = name::prepend("*", &closest_encloser);
        let wildcard_hash = hash(&wildcard)?;

        if evidence.nxdomain {
            if covering(&wildcard_hash).is_none() {
                return Err(format!("wildcard {} is not covered", wildcard));
            }
            return Ok(());
        }

        // NODATA below an opt-out span (insecure delegation)
        if qtype == RecordType::DS && next_closer_cover.record.is_opt_out() {
            return Ok(());
        }

        match matching(&wildcard_hash) {
            Some(w) if !w.record.has_type(qtype) => Ok(()),
            Some(_) => Err(format!("wildcard {} lists {}", wildcard, qtype)),
            None => Err(format!("no NSEC3 matches {} or {}", qname, wildcard)),
        }
    }
}

impl Default for DenialChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkChecker for DenialChecker {
    fn name(&self) -> &'static str {
        "denial"
    }

    fn check(&self, link: &ZoneLink, _now: i64) -> Vec<Finding> {
        link.denials
            .iter()
            .filter_map(|evidence| self.check_denial(&link.zone, evidence))
            .collect()
    }
}
