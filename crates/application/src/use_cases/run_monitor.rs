use dnssec_monitor_domain::{
    Finding, FindingCategory, Severity, TrustAnchor, WalkOutcome, ZoneLink,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::aggregate_findings::{AggregateFindingsUseCase, RunVerdict};
use crate::ports::{ChainWalker, LinkChecker};

/// Per-zone line of the final report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSummary {
    pub zone: String,
    pub nameservers: usize,
    pub ksks: usize,
    pub zsks: usize,
    pub is_anchor: bool,
}

impl ZoneSummary {
    fn from_link(link: &ZoneLink) -> Self {
        let keys = link.keys();
        Self {
            zone: link.zone.clone(),
            nameservers: link.nameservers.len(),
            ksks: keys.iter().filter(|k| k.is_ksk()).count(),
            zsks: keys.iter().filter(|k| !k.is_ksk()).count(),
            is_anchor: link.is_anchor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub zones: Vec<ZoneSummary>,
    pub findings: Vec<Finding>,
    pub verdict: RunVerdict,
}

/// Walks the chain, runs every checker over every completed link and
/// aggregates the findings
pub struct RunMonitorUseCase {
    walker: Arc<dyn ChainWalker>,
    checkers: Vec<Arc<dyn LinkChecker>>,
    aggregator: AggregateFindingsUseCase,
}

impl RunMonitorUseCase {
    pub fn new(
        walker: Arc<dyn ChainWalker>,
        checkers: Vec<Arc<dyn LinkChecker>>,
        aggregator: AggregateFindingsUseCase,
    ) -> Self {
        Self {
            walker,
            checkers,
            aggregator,
        }
    }

    #[instrument(skip(self, anchor), fields(anchor = %anchor.zone))]
    pub async fn execute(&self, target: &str, anchor: &TrustAnchor, now: i64) -> MonitorReport {
        let WalkOutcome {
            links,
            mut findings,
            failure,
        } = self.walker.walk(target, anchor).await;

        if let Some(error) = failure {
            let zone = links
                .last()
                .map(|l| l.zone.clone())
                .unwrap_or_else(|| anchor.zone.clone());
            warn!(zone = %zone, error = %error, "Chain walk failed");
            findings.push(Finding::new(
                Severity::Fatal,
                FindingCategory::Chain,
                zone,
                "chain",
                format!("chain walk failed: {}", error),
            ));
        }

        for link in &links {
            for checker in &self.checkers {
                let produced = checker.check(link, now);
                debug!(
                    zone = %link.zone,
                    checker = checker.name(),
                    findings = produced.len(),
                    "Link checked"
                );
                findings.extend(produced);
            }
        }

        let verdict = self.aggregator.execute(&findings);
        info!(
            zones = links.len(),
            findings = findings.len(),
            severity = %verdict.severity,
            exit_code = verdict.exit_code,
            "Monitor run complete"
        );

        MonitorReport {
            zones: links.iter().map(ZoneSummary::from_link).collect(),
            findings,
            verdict,
        }
    }
}
