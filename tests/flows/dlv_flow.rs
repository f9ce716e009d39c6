/// DLV Flow Tests
///
/// Lookaside validation: the registry zone is the trust anchor and its DLV
/// record for example.com stands in for the missing parent DS.
use dnssec_monitor_domain::{AnchorKind, FindingCategory, Severity};
use dnssec_monitor_tests::{MonitorHarness, SignedZone, TestServer, Universe, Window, ZoneBuilder, DAY, NOW};

const TARGET: &str = "example.com.";
const REGISTRY: &str = "dlv.example.";

fn example_zone() -> SignedZone {
    ZoneBuilder::new(TARGET, 3)
        .window(Window::days(10, 60))
        .a("alex.example.com.", [192, 0, 2, 10])
        .build()
}

async fn start(with_record: bool) -> (TestServer, String) {
    let example = example_zone();
    let registry = if with_record {
        ZoneBuilder::new(REGISTRY, 7).lookaside(&example)
    } else {
        ZoneBuilder::new(REGISTRY, 7)
    }
    .build();

    let anchor = registry.anchor_text("DS");
    let server = TestServer::start(Universe::new(vec![registry, example]))
        .await
        .expect("Failed to start server");
    (server, anchor)
}

#[tokio::test]
async fn test_lookaside_chain_exits_ok() {
    let (server, anchor) = start(true).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Dlv)
        .query("alex:A")
        .run(TARGET, NOW)
        .await;

    assert!(
        report.findings.iter().all(|f| f.severity == Severity::Info),
        "{:#?}",
        report.findings
    );
    assert_eq!(report.verdict.exit_code, 0);
    let zones: Vec<&str> = report.zones.iter().map(|z| z.zone.as_str()).collect();
    assert_eq!(zones, vec![REGISTRY, TARGET]);
    assert!(report
        .findings
        .iter()
        .any(|f| f.subject == format!("DLV RRSIG by {}", REGISTRY)));

    server.shutdown();
}

#[tokio::test]
async fn test_lookaside_expiry_is_fatal() {
    let (server, anchor) = start(true).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Dlv)
        .run(TARGET, NOW + 61 * DAY)
        .await;

    assert_eq!(report.verdict.severity, Severity::Fatal);
    assert_eq!(report.verdict.exit_code, 3);
    assert!(report
        .findings
        .iter()
        .any(|f| f.zone == TARGET && f.category == FindingCategory::Expiry && f.severity == Severity::Fatal));

    server.shutdown();
}

#[tokio::test]
async fn test_missing_lookaside_record_breaks_chain() {
    let (server, anchor) = start(false).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Dlv)
        .run(TARGET, NOW)
        .await;

    let chain: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.category == FindingCategory::Chain)
        .collect();
    assert_eq!(chain.len(), 1, "{:#?}", chain);
    assert_eq!(chain[0].message, "parent publishes no DLV record (broken chain)");
    // The registry's NXDOMAIN for the lookaside name is itself proven
    assert!(!report
        .findings
        .iter()
        .any(|f| f.category == FindingCategory::Denial));
    assert_eq!(report.verdict.exit_code, 3);

    server.shutdown();
}
