use dnssec_monitor_domain::config::{LogFormat, LoggingConfig};
use std::io::IsTerminal;
use tracing::info;

/// Logs go to stderr so the report on stdout stays machine readable
pub fn init_logging(config: &LoggingConfig) {
    let log_level = config.level.parse().unwrap_or(tracing::Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(std::io::stderr().is_terminal()).init(),
    }

    info!("Logging initialized at level: {}", config.level);
}
