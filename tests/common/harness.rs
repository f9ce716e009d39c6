use dnssec_monitor_application::use_cases::{
    AggregateFindingsUseCase, MonitorReport, RunMonitorUseCase,
};
use dnssec_monitor_domain::config::{ExitCodeConfig, LeafQuery, ThresholdConfig};
use dnssec_monitor_domain::{AnchorKind, Severity};
use dnssec_monitor_infrastructure::dns::dnssec::{
    DelegationWalker, DenialChecker, ExpiryChecker, SignatureValidator, TrustAnchorLoader,
};
use dnssec_monitor_infrastructure::dns::MessageClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// One monitor run wired the way the binary wires it
pub struct MonitorHarness {
    hint: SocketAddr,
    anchor_text: String,
    anchor_kind: AnchorKind,
    queries: Vec<String>,
    broken_chain_severity: Severity,
    timeout: Duration,
}

impl MonitorHarness {
    pub fn new(hint: SocketAddr, anchor_text: String, anchor_kind: AnchorKind) -> Self {
        Self {
            hint,
            anchor_text,
            anchor_kind,
            queries: Vec::new(),
            broken_chain_severity: Severity::Fatal,
            timeout: Duration::from_millis(500),
        }
    }

    pub fn query(mut self, raw: &str) -> Self {
        self.queries.push(raw.to_string());
        self
    }

    pub fn broken_chain_severity(mut self, severity: Severity) -> Self {
        self.broken_chain_severity = severity;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(&self, target: &str, now: i64) -> MonitorReport {
        let anchor = TrustAnchorLoader::parse(&self.anchor_text, self.anchor_kind, "test anchor")
            .unwrap();
        let queries = self
            .queries
            .iter()
            .map(|q| LeafQuery::parse(q, target).unwrap())
            .collect();

        let client = MessageClient::new(self.timeout, 2, Duration::from_millis(10), 4096);
        let walker = DelegationWalker::new(
            client,
            vec![self.hint],
            self.hint.port(),
            Duration::from_secs(30),
        )
        .with_leaf_queries(queries)
        .with_denial_probe("dnssec-monitor-probe".to_string())
        .with_broken_chain_severity(self.broken_chain_severity);

        let use_case = RunMonitorUseCase::new(
            Arc::new(walker),
            vec![
                Arc::new(SignatureValidator::new()),
                Arc::new(ExpiryChecker::new(ThresholdConfig::default())),
                Arc::new(DenialChecker::new()),
            ],
            AggregateFindingsUseCase::new(ExitCodeConfig::default()),
        );

        use_case.execute(target, &anchor, now).await
    }
}
