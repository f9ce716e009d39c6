use dnssec_monitor_application::use_cases::MonitorReport;
use dnssec_monitor_domain::Severity;
use std::fmt::Write;
use tracing::{debug, error, info, warn};

/// Emits every finding through `tracing` at the level of its severity
pub fn log_findings(report: &MonitorReport) {
    for zone in &report.zones {
        debug!(
            zone = %zone.zone,
            nameservers = zone.nameservers,
            ksks = zone.ksks,
            zsks = zone.zsks,
            anchor = zone.is_anchor,
            "Zone in chain"
        );
    }

    for finding in &report.findings {
        let category = finding.category.as_str();
        match finding.severity {
            Severity::Info => info!(zone = %finding.zone, category, subject = %finding.subject, "{}", finding.message),
            Severity::Warning => warn!(zone = %finding.zone, category, subject = %finding.subject, "{}", finding.message),
            Severity::Critical | Severity::Fatal => error!(
                zone = %finding.zone,
                category,
                severity = %finding.severity,
                subject = %finding.subject,
                "{}",
                finding.message
            ),
        }
    }
}

/// One line per finding, worst first, then a summary line
pub fn render(target: &str, report: &MonitorReport) -> String {
    let mut findings: Vec<_> = report.findings.iter().collect();
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));

    let mut out = String::new();
    for finding in findings {
        let _ = writeln!(out, "{}", finding);
    }

    let chain = report
        .zones
        .iter()
        .map(|z| z.zone.as_str())
        .collect::<Vec<_>>()
        .join(" -> ");
    let _ = writeln!(
        out,
        "{} {}: {} findings, chain [{}], exit code {}",
        report.verdict.severity.label(),
        target,
        report.findings.len(),
        chain,
        report.verdict.exit_code
    );
    out
}
