//! Configuration module for the DNSSEC monitor
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `dns`: Message client and walker settings
//! - `thresholds`: Per key class expiry thresholds
//! - `exit_codes`: Severity to exit status table
//! - `checks`: Extra queries and chain policy
//! - `anchor`: Target zone and trust-anchor files
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod anchor;
pub mod checks;
pub mod dns;
pub mod errors;
pub mod exit_codes;
pub mod logging;
pub mod root;
pub mod thresholds;

pub use anchor::AnchorConfig;
pub use checks::{ChecksConfig, LeafQuery};
pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use exit_codes::ExitCodeConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use thresholds::{KeyThresholds, ThresholdConfig};
