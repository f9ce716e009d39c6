use dnssec_monitor_domain::config::ExitCodeConfig;
use dnssec_monitor_domain::{Finding, Severity};

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunVerdict {
    pub severity: Severity,
    pub exit_code: u8,
}

/// Maps the worst finding to a process exit code
pub struct AggregateFindingsUseCase {
    exit_codes: ExitCodeConfig,
}

impl AggregateFindingsUseCase {
    pub fn new(exit_codes: ExitCodeConfig) -> Self {
        Self { exit_codes }
    }

    pub fn execute(&self, findings: &[Finding]) -> RunVerdict {
        let severity = findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Info);

        RunVerdict {
            severity,
            exit_code: self.exit_codes.code_for(severity),
        }
    }
}
