//! # DNSSEC Monitor
//!
//! Walks the chain of trust from a root or DLV anchor down to a zone, checks
//! signatures, key lifetimes and NSEC3 denial proofs, and exits with a code
//! reflecting the worst finding.

mod bootstrap;
mod report;

use clap::Parser;
use dnssec_monitor_application::use_cases::{AggregateFindingsUseCase, RunMonitorUseCase};
use dnssec_monitor_domain::CliOverrides;
use dnssec_monitor_infrastructure::dns::dnssec::{
    DelegationWalker, DenialChecker, ExpiryChecker, SignatureValidator,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "dnssec-monitor")]
#[command(version)]
#[command(about = "Checks the DNSSEC chain of trust and key lifetimes of a zone")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Zone to monitor
    #[arg(short = 'z', long)]
    zone: Option<String>,

    /// Root trust anchor file (DNSKEY or DS records)
    #[arg(long)]
    rootkey: Option<String>,

    /// DLV trust anchor file; takes precedence over --rootkey
    #[arg(long)]
    dlvkey: Option<String>,

    /// Bootstrap servers, ip or ip:port (repeatable or comma separated)
    #[arg(long)]
    hints: Vec<String>,

    /// DNS port for name servers and port-less hints
    #[arg(long)]
    port: Option<u16>,

    /// ZSK warning threshold in days
    #[arg(long = "zskwarn")]
    zsk_warn: Option<u32>,

    /// ZSK critical threshold in days
    #[arg(long = "zskcritical")]
    zsk_critical: Option<u32>,

    /// KSK warning threshold in days
    #[arg(long = "kskwarn")]
    ksk_warn: Option<u32>,

    /// KSK critical threshold in days
    #[arg(long = "kskcritical")]
    ksk_critical: Option<u32>,

    /// Check time, RFC 3339 or Unix seconds (default: now)
    #[arg(long)]
    now: Option<String>,

    /// Extra RRset to validate, name[:TYPE] (repeatable)
    #[arg(short = 'q', long = "query")]
    queries: Vec<String>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            zone: self.zone.clone(),
            rootkey: self.rootkey.clone(),
            dlvkey: self.dlvkey.clone(),
            hints: self.hints.clone(),
            port: self.port,
            zsk_warn: self.zsk_warn,
            zsk_critical: self.zsk_critical,
            ksk_warn: self.ksk_warn,
            ksk_critical: self.ksk_critical,
            queries: self.queries.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match bootstrap::load_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(failure) => {
            eprintln!("dnssec-monitor: {}", failure.error);
            return ExitCode::from(failure.exit_code);
        }
    };

    bootstrap::init_logging(&config.logging);
    bootstrap::config::log_config(&config, cli.config.as_deref());
    let fatal = ExitCode::from(config.exit_codes.fatal);

    let now = match bootstrap::resolve_now(cli.now.as_deref()) {
        Ok(now) => now,
        Err(e) => {
            error!(error = %e, "Invalid check time");
            eprintln!("dnssec-monitor: {:#}", e);
            return fatal;
        }
    };

    let anchor = match bootstrap::load_anchor(&config.anchor) {
        Ok(anchor) => anchor,
        Err(e) => {
            error!(error = %e, "Failed to load trust anchor");
            eprintln!("dnssec-monitor: {:#}", e);
            return fatal;
        }
    };

    let walker = match DelegationWalker::from_config(&config) {
        Ok(walker) => walker,
        Err(e) => {
            error!(error = %e, "Invalid walker configuration");
            eprintln!("dnssec-monitor: {}", e);
            return fatal;
        }
    };

    let use_case = RunMonitorUseCase::new(
        Arc::new(walker),
        vec![
            Arc::new(SignatureValidator::new()),
            Arc::new(ExpiryChecker::new(config.thresholds)),
            Arc::new(DenialChecker::new()),
        ],
        AggregateFindingsUseCase::new(config.exit_codes),
    );

    let target = config.zone().to_string();
    let monitor_report = use_case.execute(&target, &anchor, now).await;

    report::log_findings(&monitor_report);
    print!("{}", report::render(&target, &monitor_report));

    ExitCode::from(monitor_report.verdict.exit_code)
}
