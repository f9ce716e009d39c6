/// Monitor Flow Tests
///
/// Full runs from the root anchor down to example.com against the mock
/// authoritative server: walk, signature, expiry and denial checks,
/// aggregation into an exit code.
use dnssec_monitor_domain::{AnchorKind, Finding, FindingCategory, RecordType, Severity};
use dnssec_monitor_tests::{MonitorHarness, SignedZone, TestServer, Universe, Window, ZoneBuilder, DAY, NOW};
use std::time::Duration;

const TARGET: &str = "example.com.";

struct Hierarchy {
    root: SignedZone,
    com: SignedZone,
    example: SignedZone,
}

fn example_zone(window: Window) -> SignedZone {
    ZoneBuilder::new("example.com.", 3)
        .window(window)
        .a("alex.example.com.", [192, 0, 2, 10])
        .a("www.example.com.", [192, 0, 2, 80])
        .build()
}

fn hierarchy(example: SignedZone, bad_ds: bool) -> Hierarchy {
    let com = if bad_ds {
        ZoneBuilder::new("com.", 2).delegate_with_bad_ds(&example)
    } else {
        ZoneBuilder::new("com.", 2).delegate(&example)
    }
    .build();
    let root = ZoneBuilder::new(".", 1).delegate(&com).build();
    Hierarchy { root, com, example }
}

async fn start(hierarchy: Hierarchy) -> (TestServer, String) {
    let anchor = hierarchy.root.anchor_text("DS");
    let universe = Universe::new(vec![hierarchy.root, hierarchy.com, hierarchy.example]);
    let server = TestServer::start(universe).await.expect("Failed to start server");
    (server, anchor)
}

fn above_info(findings: &[Finding]) -> Vec<&Finding> {
    findings.iter().filter(|f| f.severity > Severity::Info).collect()
}

// ============================================================================
// Healthy chain
// ============================================================================

#[tokio::test]
async fn test_correct_chain_exits_ok() {
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 60)), false)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .query("alex:A")
        .run(TARGET, NOW)
        .await;

    assert!(above_info(&report.findings).is_empty(), "{:#?}", report.findings);
    assert_eq!(report.verdict.exit_code, 0);
    let zones: Vec<&str> = report.zones.iter().map(|z| z.zone.as_str()).collect();
    assert_eq!(zones, vec![".", "com.", "example.com."]);
    assert!(report.zones[0].is_anchor);
    assert_eq!(report.zones[2].ksks, 1);
    assert_eq!(report.zones[2].zsks, 1);

    server.shutdown();
}

#[tokio::test]
async fn test_nonexistent_name_outside_zone_is_proven() {
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 60)), false)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .query("example.com.not.there.:DS")
        .run(TARGET, NOW)
        .await;

    assert!(above_info(&report.findings).is_empty(), "{:#?}", report.findings);
    assert_eq!(report.verdict.exit_code, 0);

    server.shutdown();
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 25)), false)).await;
    let harness = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root).query("www:A");

    let first = harness.run(TARGET, NOW).await;
    let second = harness.run(TARGET, NOW).await;

    assert_eq!(first.findings, second.findings);
    assert_eq!(first.verdict, second.verdict);

    server.shutdown();
}

// ============================================================================
// Lifetimes
// ============================================================================

#[tokio::test]
async fn test_expired_signatures_are_fatal() {
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 60)), false)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW + 61 * DAY)
        .await;

    assert_eq!(report.verdict.severity, Severity::Fatal);
    assert_eq!(report.verdict.exit_code, 3);
    let expired: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.category == FindingCategory::Expiry && f.severity == Severity::Fatal)
        .collect();
    assert!(!expired.is_empty());
    assert!(expired.iter().all(|f| f.zone == TARGET));

    server.shutdown();
}

#[tokio::test]
async fn test_ksk_inside_warning_window() {
    // 20 days left: under the 30 day KSK warning, above the 7 day ZSK one
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 20)), false)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    let flagged = above_info(&report.findings);
    assert_eq!(flagged.len(), 1, "{:#?}", flagged);
    assert!(flagged[0].subject.starts_with("KSK"));
    assert_eq!(report.verdict.exit_code, 1);

    server.shutdown();
}

#[tokio::test]
async fn test_future_inception_is_fatal() {
    let window = Window {
        inception: NOW + DAY,
        expiration: NOW + 90 * DAY,
    };
    let (server, anchor) = start(hierarchy(example_zone(window), false)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    assert!(report
        .findings
        .iter()
        .any(|f| f.severity == Severity::Fatal && f.message.starts_with("signature not yet valid")));
    assert_eq!(report.verdict.exit_code, 3);

    server.shutdown();
}

// ============================================================================
// Broken chain
// ============================================================================

#[tokio::test]
async fn test_ds_mismatch_breaks_chain() {
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 60)), true)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    let ds: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.message == "DS does not match any DNSKEY")
        .collect();
    assert_eq!(ds.len(), 1);
    assert_eq!(ds[0].severity, Severity::Critical);

    assert!(report
        .findings
        .iter()
        .any(|f| f.category == FindingCategory::Chain && f.message.contains("broken chain")));
    // RRset signatures themselves still validate
    assert!(!report
        .findings
        .iter()
        .any(|f| f.message.starts_with("signature invalid")));
    assert_eq!(report.verdict.exit_code, 3);

    server.shutdown();
}

#[tokio::test]
async fn test_broken_chain_severity_is_configurable() {
    let (server, anchor) = start(hierarchy(example_zone(Window::days(10, 60)), true)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .broken_chain_severity(Severity::Critical)
        .run(TARGET, NOW)
        .await;

    assert_eq!(report.verdict.severity, Severity::Critical);
    assert_eq!(report.verdict.exit_code, 2);

    server.shutdown();
}

#[tokio::test]
async fn test_wrong_trust_anchor_breaks_chain() {
    let hierarchy = hierarchy(example_zone(Window::days(10, 60)), false);
    let stranger = ZoneBuilder::new(".", 42).build();
    let anchor = stranger.anchor_text("DS");
    let universe = Universe::new(vec![hierarchy.root, hierarchy.com, hierarchy.example]);
    let server = TestServer::start(universe).await.unwrap();

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    assert!(report
        .findings
        .iter()
        .any(|f| f.subject == "trust anchor" && f.severity == Severity::Fatal));
    assert_eq!(report.verdict.exit_code, 3);

    server.shutdown();
}

// ============================================================================
// Denial of existence
// ============================================================================

#[tokio::test]
async fn test_missing_nsec3_cover_is_one_critical_finding() {
    let mut example = example_zone(Window::days(10, 60));
    example.remove_nsec3_covering("dnssec-monitor-probe.example.com.");
    let (server, anchor) = start(hierarchy(example, false)).await;

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    let denial: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.category == FindingCategory::Denial)
        .collect();
    assert_eq!(denial.len(), 1, "{:#?}", denial);
    assert_eq!(denial[0].severity, Severity::Critical);
    assert_eq!(report.verdict.exit_code, 2);

    server.shutdown();
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failed_ds_query_fails_the_walk() {
    let hierarchy = hierarchy(example_zone(Window::days(10, 60)), false);
    let anchor = hierarchy.root.anchor_text("DS");
    let universe = Universe::new(vec![hierarchy.root, hierarchy.com, hierarchy.example])
        .servfail("example.com.", RecordType::DS);
    let server = TestServer::start(universe).await.unwrap();

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    let zones: Vec<&str> = report.zones.iter().map(|z| z.zone.as_str()).collect();
    assert_eq!(zones, vec![".", "com."]);
    assert!(report.findings.iter().any(|f| f.category == FindingCategory::Chain
        && f.severity == Severity::Fatal
        && f.message.starts_with("chain walk failed")));
    assert_eq!(report.verdict.exit_code, 3);

    server.shutdown();
}

#[tokio::test]
async fn test_unreachable_hint_is_fatal() {
    let hierarchy = hierarchy(example_zone(Window::days(10, 60)), false);
    let anchor = hierarchy.root.anchor_text("DS");
    let silent = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let hint = silent.local_addr().unwrap();

    let report = MonitorHarness::new(hint, anchor, AnchorKind::Root)
        .timeout(Duration::from_millis(100))
        .run(TARGET, NOW)
        .await;

    assert!(report.zones.is_empty());
    let chain: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.category == FindingCategory::Chain)
        .collect();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].severity, Severity::Fatal);
    assert!(chain[0].message.starts_with("chain walk failed"));
    assert_eq!(report.verdict.exit_code, 3);
}

#[tokio::test]
async fn test_unhosted_zone_keeps_completed_links() {
    let hierarchy = hierarchy(example_zone(Window::days(10, 60)), false);
    let anchor = hierarchy.root.anchor_text("DS");
    // example.com. is delegated but not served, so com. answers NODATA for its NS
    let universe = Universe::new(vec![hierarchy.root, hierarchy.com]);
    let server = TestServer::start(universe).await.unwrap();

    let report = MonitorHarness::new(server.addr(), anchor, AnchorKind::Root)
        .run(TARGET, NOW)
        .await;

    let zones: Vec<&str> = report.zones.iter().map(|z| z.zone.as_str()).collect();
    assert_eq!(zones, vec![".", "com."]);
    assert_eq!(report.verdict.exit_code, 3);

    server.shutdown();
}
