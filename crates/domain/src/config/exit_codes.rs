use super::errors::ConfigError;
use crate::Severity;
use serde::{Deserialize, Serialize};

/// Process exit status per overall severity
///
/// Codes must increase strictly with severity. `Info` maps to `ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExitCodeConfig {
    #[serde(default = "default_ok")]
    pub ok: u8,

    #[serde(default = "default_warning")]
    pub warning: u8,

    #[serde(default = "default_critical")]
    pub critical: u8,

    #[serde(default = "default_fatal")]
    pub fatal: u8,
}

impl ExitCodeConfig {
    pub fn code_for(&self, severity: Severity) -> u8 {
        match severity {
            Severity::Info => self.ok,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            Severity::Fatal => self.fatal,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ok != 0 {
            return Err(ConfigError::InvalidExitCodes(format!(
                "ok must be 0, got {}",
                self.ok
            )));
        }
        if !(self.ok < self.warning && self.warning < self.critical && self.critical < self.fatal)
        {
            return Err(ConfigError::InvalidExitCodes(format!(
                "codes must increase with severity (ok={}, warning={}, critical={}, fatal={})",
                self.ok, self.warning, self.critical, self.fatal
            )));
        }
        Ok(())
    }
}

impl Default for ExitCodeConfig {
    fn default() -> Self {
        Self {
            ok: default_ok(),
            warning: default_warning(),
            critical: default_critical(),
            fatal: default_fatal(),
        }
    }
}

fn default_ok() -> u8 {
    0
}

fn default_warning() -> u8 {
    1
}

fn default_critical() -> u8 {
    2
}

fn default_fatal() -> u8 {
    3
}
