use async_trait::async_trait;
use dnssec_monitor_domain::{TrustAnchor, WalkOutcome};

/// Builds the chain of zone links from a trust anchor down to a target zone
///
/// Failures are reported inside the outcome so the links completed before a
/// failure can still be checked.
#[async_trait]
pub trait ChainWalker: Send + Sync {
    async fn walk(&self, target: &str, anchor: &TrustAnchor) -> WalkOutcome;
}
