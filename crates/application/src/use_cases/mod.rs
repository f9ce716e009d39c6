pub mod aggregate_findings;
pub mod run_monitor;

pub use aggregate_findings::{AggregateFindingsUseCase, RunVerdict};
pub use run_monitor::{MonitorReport, RunMonitorUseCase, ZoneSummary};
