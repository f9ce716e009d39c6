use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid exit codes: {0}")]
    InvalidExitCodes(String),

    #[error("Invalid zone: {0}")]
    InvalidZone(String),

    #[error("Invalid hint server: {0}")]
    InvalidHint(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No trust anchor configured (use --rootkey or --dlvkey)")]
    MissingTrustAnchor,

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
