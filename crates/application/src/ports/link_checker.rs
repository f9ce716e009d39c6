use dnssec_monitor_domain::{Finding, ZoneLink};

/// A pure check over one completed zone link
pub trait LinkChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// `now` is Unix seconds; it is the only clock a checker may use.
    fn check(&self, link: &ZoneLink, now: i64) -> Vec<Finding>;
}
