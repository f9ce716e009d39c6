use super::crypto::SignatureVerifier;
use crate::dns::client::MessageClient;
use crate::dns::forwarding::DnsResponse;
use async_trait::async_trait;
use dnssec_monitor_application::ports::ChainWalker;
use dnssec_monitor_domain::config::{Config, ConfigError, LeafQuery};
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{
    AnchorKind, DenialEvidence, DomainError, Finding, FindingCategory, NameServer, RecordType,
    ResourceRecord, Severity, SignedRrset, TrustAnchor, WalkOutcome, ZoneLink,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parent-side view of a delegation
struct Delegation {
    ns_names: Vec<String>,
    glue: Vec<ResourceRecord>,
    signer: Option<SignedRrset>,
    signer_denial: Option<DenialEvidence>,
}

/// Links and findings gathered so far; survives a failed step
#[derive(Default)]
struct WalkState {
    links: Vec<ZoneLink>,
    findings: Vec<Finding>,
}

/// Walks the delegation chain from a trust anchor down to a target zone
///
/// Every walk starts from the hint servers and keeps no state between runs.
pub struct DelegationWalker {
    client: MessageClient,
    hints: Vec<SocketAddr>,
    port: u16,
    deadline: Duration,
    leaf_queries: Vec<LeafQuery>,
    probe_label: Option<String>,
    broken_chain_severity: Severity,
    verifier: SignatureVerifier,
}

impl DelegationWalker {
    pub fn new(client: MessageClient, hints: Vec<SocketAddr>, port: u16, deadline: Duration) -> Self {
        Self {
            client,
            hints,
            port,
            deadline,
            leaf_queries: Vec::new(),
            probe_label: None,
            broken_chain_severity: Severity::Fatal,
            verifier: SignatureVerifier,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let walker = Self::new(
            MessageClient::from_config(&config.dns),
            config.dns.hint_addrs()?,
            config.dns.port,
            config.dns.deadline(),
        )
        .with_leaf_queries(config.checks.leaf_queries(config.zone())?)
        .with_broken_chain_severity(config.checks.broken_chain_severity);

        Ok(if config.checks.denial_probe {
            walker.with_denial_probe(config.checks.probe_label.clone())
        } else {
            walker
        })
    }

    pub fn with_leaf_queries(mut self, queries: Vec<LeafQuery>) -> Self {
        self.leaf_queries = queries;
        self
    }

    pub fn with_denial_probe(mut self, label: String) -> Self {
        self.probe_label = Some(label);
        self
    }

    pub fn with_broken_chain_severity(mut self, severity: Severity) -> Self {
        self.broken_chain_severity = severity;
        self
    }

    async fn walk_chain(
        &self,
        target: &str,
        anchor: &TrustAnchor,
        state: &mut WalkState,
    ) -> Result<(), DomainError> {
        match anchor.kind {
            AnchorKind::Root => self.walk_from_root(target, anchor, state).await?,
            AnchorKind::Dlv => self.walk_lookaside(target, anchor, state).await?,
        }
        self.query_leaves(target, state).await;
        Ok(())
    }

    async fn walk_from_root(
        &self,
        target: &str,
        anchor: &TrustAnchor,
        state: &mut WalkState,
    ) -> Result<(), DomainError> {
        let path = name::zone_path(&anchor.zone, target)?;
        info!(anchor = %anchor.zone, target = %target, steps = path.len(), "Walking chain of trust");

        let mut link = self.fetch_apex(&anchor.zone, self.hint_servers()).await?;
        link.is_anchor = true;
        self.check_anchor(&link, anchor, state);
        state.links.push(link);

        for child in path.iter().skip(1) {
            let is_target = *child == target;
            let parent_index = state.links.len() - 1;
            let parent = &state.links[parent_index];

            let Some(delegation) = self.fetch_delegation(parent, child, RecordType::DS).await? else {
                if is_target {
                    return Err(DomainError::UnresolvableDelegation(child.clone()));
                }
                debug!(name = %child, "Not a zone cut, skipping");
                continue;
            };

            let servers = self
                .resolve_servers(child, &delegation.ns_names, &delegation.glue)
                .await?;
            let parent_zone = parent.zone.clone();
            let parent_keys = parent.keys();

            let mut link = self.fetch_apex(child, servers).await?;
            link.parent_zone = Some(parent_zone);
            link.parent_keys = parent_keys;
            self.attach_signer(&mut link, delegation, parent_index, state);
            state.links.push(link);
        }

        Ok(())
    }

    /// DLV mode: [lookaside zone, target], the DLV RRset standing in for DS
    async fn walk_lookaside(
        &self,
        target: &str,
        anchor: &TrustAnchor,
        state: &mut WalkState,
    ) -> Result<(), DomainError> {
        info!(registry = %anchor.zone, target = %target, "Walking lookaside chain");

        let mut registry = self.fetch_apex(&anchor.zone, self.hint_servers()).await?;
        registry.is_anchor = true;
        self.check_anchor(&registry, anchor, state);
        state.links.push(registry);

        let hints = ZoneLink {
            nameservers: self.hint_servers(),
            ..ZoneLink::new(".".to_string())
        };
        let delegation = self
            .fetch_delegation(&hints, target, RecordType::NS)
            .await?
            .ok_or_else(|| DomainError::UnresolvableDelegation(target.to_string()))?;
        let servers = self
            .resolve_servers(target, &delegation.ns_names, &delegation.glue)
            .await?;

        let mut link = self.fetch_apex(target, servers).await?;
        link.parent_zone = Some(anchor.zone.clone());
        link.parent_keys = state.links[0].keys();

        let dlv_name = Self::lookaside_name(target, &anchor.zone);
        let (signer, signer_denial) = self
            .fetch_signer(&state.links[0], &dlv_name, RecordType::DLV)
            .await?;
        let delegation = Delegation {
            ns_names: delegation.ns_names,
            glue: Vec::new(),
            signer,
            signer_denial,
        };
        self.attach_signer(&mut link, delegation, 0, state);
        state.links.push(link);
        Ok(())
    }

    /// `example.com.` under `dlv.example.` → `example.com.dlv.example.`
    fn lookaside_name(target: &str, registry: &str) -> String {
        name::labels(target)
            .iter()
            .rev()
            .fold(name::normalize(registry), |acc, label| name::prepend(label, &acc))
    }

    fn hint_servers(&self) -> Vec<NameServer> {
        self.hints
            .iter()
            .map(|addr| NameServer {
                name: "hint".to_string(),
                addr: *addr,
            })
            .collect()
    }

    /// Asks each server in turn for DNSKEY, SOA and NS at the apex
    async fn fetch_apex(
        &self,
        zone: &str,
        servers: Vec<NameServer>,
    ) -> Result<ZoneLink, DomainError> {
        let mut last_error = DomainError::UnresolvableDelegation(zone.to_string());

        for server in &servers {
            let (dnskey, soa, ns) = tokio::join!(
                self.client.query(zone, RecordType::DNSKEY, server.addr),
                self.client.query(zone, RecordType::SOA, server.addr),
                self.client.query(zone, RecordType::NS, server.addr),
            );

            match (dnskey, soa, ns) {
                (Ok(dnskey), Ok(soa), Ok(ns)) => {
                    let mut link = ZoneLink::new(zone.to_string());
                    link.dnskeys = SignedRrset::collect(&dnskey.answers, zone, RecordType::DNSKEY);
                    link.soa = SignedRrset::collect(&soa.answers, zone, RecordType::SOA);
                    link.ns = SignedRrset::collect(&ns.answers, zone, RecordType::NS);
                    link.nameservers = servers.clone();

                    info!(
                        zone = %zone,
                        server = %server,
                        keys = link.keys().len(),
                        "Zone apex fetched"
                    );
                    return Ok(link);
                }
                (dnskey, soa, ns) => {
                    let error = [dnskey.err(), soa.err(), ns.err()]
                        .into_iter()
                        .flatten()
                        .next()
                        .unwrap_or_else(|| DomainError::UnresolvableDelegation(zone.to_string()));
                    warn!(zone = %zone, server = %server, error = %error, "Skipping server");
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }

    /// Asks the parent's servers for the child's NS and delegation signer.
    ///
    /// `None` when the child is not a zone cut. `signer_type` is DS, or NS
    /// when only the NS set is wanted. A server is only used when both of its
    /// answers arrive; the last failure is returned when none does.
    async fn fetch_delegation(
        &self,
        parent: &ZoneLink,
        child: &str,
        signer_type: RecordType,
    ) -> Result<Option<Delegation>, DomainError> {
        let mut last_error = DomainError::UnresolvableDelegation(child.to_string());

        for server in &parent.nameservers {
            let (ns, signer) = tokio::join!(
                self.client.query(child, RecordType::NS, server.addr),
                self.client.query(child, signer_type, server.addr),
            );

            let ns = match ns {
                Ok(ns) => ns,
                Err(e) => {
                    warn!(zone = %child, server = %server, error = %e, "Skipping server");
                    last_error = e;
                    continue;
                }
            };

            let records: Vec<ResourceRecord> =
                ns.answers.iter().chain(ns.authority.iter()).cloned().collect();
            let Some(ns_set) = SignedRrset::collect(&records, child, RecordType::NS) else {
                if ns.is_nxdomain() {
                    return Err(DomainError::UnresolvableDelegation(child.to_string()));
                }
                return Ok(None);
            };

            // A delegation without its DS answer cannot be checked
            let (signer, signer_denial) = match (signer_type, signer) {
                (RecordType::DS, Ok(response)) => Self::split_signer(response, child, RecordType::DS),
                (RecordType::DS, Err(e)) => {
                    warn!(zone = %child, server = %server, error = %e, "DS query failed, skipping server");
                    last_error = e;
                    continue;
                }
                _ => (None, None),
            };

            let ns_names = ns_set
                .records
                .iter()
                .filter_map(|r| name::from_wire(&r.rdata).ok().map(|(n, _)| n))
                .collect();

            return Ok(Some(Delegation {
                ns_names,
                glue: ns.additional,
                signer,
                signer_denial,
            }));
        }

        Err(last_error)
    }

    /// Queries a DS or DLV RRset from the servers of `zone_link`
    async fn fetch_signer(
        &self,
        zone_link: &ZoneLink,
        owner: &str,
        record_type: RecordType,
    ) -> Result<(Option<SignedRrset>, Option<DenialEvidence>), DomainError> {
        let mut last_error = DomainError::UnresolvableDelegation(owner.to_string());
        for server in &zone_link.nameservers {
            match self.client.query(owner, record_type, server.addr).await {
                Ok(response) => return Ok(Self::split_signer(response, owner, record_type)),
                Err(e) => {
                    warn!(name = %owner, server = %server, error = %e, "Skipping server");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn split_signer(
        response: DnsResponse,
        owner: &str,
        record_type: RecordType,
    ) -> (Option<SignedRrset>, Option<DenialEvidence>) {
        match SignedRrset::collect(&response.answers, owner, record_type) {
            Some(rrset) => (Some(rrset), None),
            None => {
                let nxdomain = response.is_nxdomain();
                (
                    None,
                    Some(DenialEvidence {
                        query_name: name::normalize(owner),
                        query_type: record_type,
                        nxdomain,
                        records: response.authority,
                    }),
                )
            }
        }
    }

    /// Stores the DS/DLV set on the child, or its denial on the parent, and
    /// raises broken-chain findings.
    fn attach_signer(
        &self,
        link: &mut ZoneLink,
        delegation: Delegation,
        parent_index: usize,
        state: &mut WalkState,
    ) {
        if let Some(denial) = delegation.signer_denial {
            let kind = denial.query_type;
            state.links[parent_index].denials.push(denial);
            state.findings.push(self.broken_chain(
                &link.zone,
                kind,
                format!("parent publishes no {} record (broken chain)", kind),
            ));
            return;
        }

        let Some(signer) = delegation.signer else {
            return;
        };
        let kind = signer.record_type;
        let digests = signer.delegation_signers();
        let ksks: Vec<_> = link.keys().into_iter().filter(|k| k.is_ksk()).collect();
        let matched = digests.iter().any(|ds| {
            ksks.iter()
                .any(|key| matches!(self.verifier.verify_ds(ds, key, &link.zone), Ok(true)))
        });

        if !matched {
            state.findings.push(self.broken_chain(
                &link.zone,
                kind,
                format!("no {} published by parent matches a KSK (broken chain)", kind),
            ));
        } else {
            debug!(zone = %link.zone, "Delegation signer matches a KSK");
        }
        link.delegation_signer = Some(signer);
    }

    fn check_anchor(&self, link: &ZoneLink, anchor: &TrustAnchor, state: &mut WalkState) {
        let matched = link.keys().iter().any(|key| {
            anchor.matches_key(key)
                || anchor
                    .digests
                    .iter()
                    .any(|ds| matches!(self.verifier.verify_ds(ds, key, &anchor.zone), Ok(true)))
        });

        if !matched {
            state.findings.push(Finding::new(
                self.broken_chain_severity,
                FindingCategory::Chain,
                &anchor.zone,
                "trust anchor",
                format!(
                    "no DNSKEY matches the trust anchor from {} (broken chain)",
                    anchor.description
                ),
            ));
        }
    }

    fn broken_chain(&self, zone: &str, kind: RecordType, message: String) -> Finding {
        warn!(zone = %zone, "{}", message);
        Finding::new(
            self.broken_chain_severity,
            FindingCategory::Chain,
            zone,
            kind.to_string(),
            message,
        )
    }

    /// Server addresses from glue, else from A/AAAA lookups against the hints
    async fn resolve_servers(
        &self,
        zone: &str,
        ns_names: &[String],
        glue: &[ResourceRecord],
    ) -> Result<Vec<NameServer>, DomainError> {
        let mut servers = Vec::new();

        for ns_name in ns_names {
            let mut addrs: Vec<IpAddr> = glue
                .iter()
                .filter(|r| r.name == *ns_name)
                .filter_map(Self::address_of)
                .collect();

            if addrs.is_empty() {
                addrs = self.lookup_addresses(ns_name).await;
            }

            servers.extend(addrs.into_iter().map(|ip| NameServer {
                name: ns_name.clone(),
                addr: SocketAddr::new(ip, self.port),
            }));
        }

        if servers.is_empty() {
            return Err(DomainError::UnresolvableDelegation(zone.to_string()));
        }

        debug!(zone = %zone, servers = servers.len(), "Name servers resolved");
        Ok(servers)
    }

    async fn lookup_addresses(&self, ns_name: &str) -> Vec<IpAddr> {
        for hint in &self.hints {
            let (a, aaaa) = tokio::join!(
                self.client.query(ns_name, RecordType::A, *hint),
                self.client.query(ns_name, RecordType::AAAA, *hint),
            );
            let addrs: Vec<IpAddr> = [a, aaaa]
                .into_iter()
                .filter_map(Result::ok)
                .flat_map(|response| response.answers)
                .filter(|r| r.name == ns_name)
                .filter_map(|r| Self::address_of(&r))
                .collect();
            if !addrs.is_empty() {
                return addrs;
            }
        }
        warn!(name = %ns_name, "No address found for name server");
        Vec::new()
    }

    fn address_of(record: &ResourceRecord) -> Option<IpAddr> {
        match record.record_type {
            RecordType::A => <[u8; 4]>::try_from(record.rdata.as_slice())
                .ok()
                .map(|octets| IpAddr::V4(Ipv4Addr::from(octets))),
            RecordType::AAAA => <[u8; 16]>::try_from(record.rdata.as_slice())
                .ok()
                .map(|octets| IpAddr::V6(Ipv6Addr::from(octets))),
            _ => None,
        }
    }

    /// Explicit queries and the denial probe, each sent to the deepest link
    /// enclosing the name
    async fn query_leaves(&self, target: &str, state: &mut WalkState) {
        let mut queries = self.leaf_queries.clone();
        if let Some(label) = &self.probe_label {
            queries.push(LeafQuery {
                name: name::prepend(label, target),
                record_type: RecordType::A,
            });
        }

        for query in queries {
            let Some(index) = state
                .links
                .iter()
                .enumerate()
                .filter(|(_, link)| name::is_subdomain(&query.name, &link.zone))
                .max_by_key(|(_, link)| name::label_count(&link.zone))
                .map(|(i, _)| i)
            else {
                warn!(name = %query.name, "No zone of the chain encloses the query");
                continue;
            };

            let link = &state.links[index];
            let mut answered = None;
            for server in &link.nameservers {
                match self.client.query(&query.name, query.record_type, server.addr).await {
                    Ok(response) => {
                        answered = Some(response);
                        break;
                    }
                    Err(e) => {
                        warn!(name = %query.name, server = %server, error = %e, "Skipping server");
                    }
                }
            }

            let Some(response) = answered else {
                state.findings.push(Finding::new(
                    Severity::Critical,
                    FindingCategory::Chain,
                    &link.zone,
                    format!("{} {}", query.name, query.record_type),
                    "no server answered the query",
                ));
                continue;
            };

            let link = &mut state.links[index];
            match SignedRrset::collect(&response.answers, &query.name, query.record_type) {
                Some(rrset) => {
                    debug!(name = %query.name, record_type = %query.record_type, "Leaf RRset fetched");
                    link.leaf_rrsets.push(rrset);
                }
                None => {
                    debug!(
                        name = %query.name,
                        record_type = %query.record_type,
                        nxdomain = response.is_nxdomain(),
                        "Negative answer"
                    );
                    link.denials.push(DenialEvidence {
                        query_name: query.name.clone(),
                        query_type: query.record_type,
                        nxdomain: response.is_nxdomain(),
                        records: response.authority,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl ChainWalker for DelegationWalker {
    async fn walk(&self, target: &str, anchor: &TrustAnchor) -> WalkOutcome {
        let target = name::normalize(target);
        let mut state = WalkState::default();

        let result = tokio::time::timeout(
            self.deadline,
            self.walk_chain(&target, anchor, &mut state),
        )
        .await;

        match result {
            Ok(Ok(())) => WalkOutcome {
                links: state.links,
                findings: state.findings,
                failure: None,
            },
            Ok(Err(error)) => {
                warn!(target = %target, error = %error, "Chain walk aborted");
                WalkOutcome {
                    links: state.links,
                    findings: state.findings,
                    failure: Some(error),
                }
            }
            Err(_) => {
                warn!(target = %target, deadline = ?self.deadline, "Chain walk deadline exceeded");
                WalkOutcome {
                    links: Vec::new(),
                    findings: Vec::new(),
                    failure: Some(DomainError::WalkDeadlineExceeded(self.deadline.as_secs())),
                }
            }
        }
    }
}
