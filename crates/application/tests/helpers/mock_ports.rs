#![allow(dead_code)]

use async_trait::async_trait;
use dnssec_monitor_application::ports::{ChainWalker, LinkChecker};
use dnssec_monitor_domain::{
    DomainError, Finding, FindingCategory, Severity, TrustAnchor, WalkOutcome, ZoneLink,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Mock ChainWalker
// ============================================================================

pub struct MockChainWalker {
    zones: Vec<String>,
    walker_findings: Vec<Finding>,
    failure: Option<fn() -> DomainError>,
    calls: Arc<AtomicUsize>,
}

impl MockChainWalker {
    pub fn new(zones: &[&str]) -> Self {
        Self {
            zones: zones.iter().map(|z| z.to_string()).collect(),
            walker_findings: Vec::new(),
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_finding(mut self, finding: Finding) -> Self {
        self.walker_findings.push(finding);
        self
    }

    pub fn failing_with(mut self, failure: fn() -> DomainError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChainWalker for MockChainWalker {
    async fn walk(&self, _target: &str, _anchor: &TrustAnchor) -> WalkOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let links = self
            .zones
            .iter()
            .enumerate()
            .map(|(i, zone)| {
                let mut link = ZoneLink::new(zone.clone());
                link.is_anchor = i == 0;
                link
            })
            .collect();
        WalkOutcome {
            links,
            findings: self.walker_findings.clone(),
            failure: self.failure.map(|f| f()),
        }
    }
}

// ============================================================================
// Mock LinkChecker
// ============================================================================

/// Emits one finding of a fixed severity for every zone in `zones`
pub struct FixedSeverityChecker {
    pub severity: Severity,
    pub zones: Vec<String>,
}

impl FixedSeverityChecker {
    pub fn new(severity: Severity, zones: &[&str]) -> Self {
        Self {
            severity,
            zones: zones.iter().map(|z| z.to_string()).collect(),
        }
    }
}

impl LinkChecker for FixedSeverityChecker {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn check(&self, link: &ZoneLink, _now: i64) -> Vec<Finding> {
        if self.zones.contains(&link.zone) {
            vec![Finding::new(
                self.severity,
                FindingCategory::Expiry,
                link.zone.clone(),
                "ZSK tag 1",
                format!("checked at {}", self.severity),
            )]
        } else {
            Vec::new()
        }
    }
}
