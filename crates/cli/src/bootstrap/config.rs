use dnssec_monitor_domain::config::ExitCodeConfig;
use dnssec_monitor_domain::{CliOverrides, Config, ConfigError};
use tracing::info;

/// Configuration that failed to load or validate, with the exit code to
/// report it under
pub struct ConfigFailure {
    pub error: ConfigError,
    pub exit_code: u8,
}

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> Result<Config, ConfigFailure> {
    let config = Config::load(config_path, cli_overrides).map_err(|error| ConfigFailure {
        error,
        exit_code: ExitCodeConfig::default().fatal,
    })?;

    config.validate().map_err(|error| {
        // A broken exit-code table cannot pick its own fatal code
        let exit_code = match config.exit_codes.validate() {
            Ok(()) => config.exit_codes.fatal,
            Err(_) => ExitCodeConfig::default().fatal,
        };
        ConfigFailure { error, exit_code }
    })?;

    Ok(config)
}

pub fn log_config(config: &Config, config_path: Option<&str>) {
    info!(
        config_file = config_path.unwrap_or("default"),
        zone = %config.zone(),
        hints = ?config.dns.hints,
        port = config.dns.port,
        ksk_warn = config.thresholds.ksk.warn_days,
        ksk_critical = config.thresholds.ksk.critical_days,
        zsk_warn = config.thresholds.zsk.warn_days,
        zsk_critical = config.thresholds.zsk.critical_days,
        "Configuration loaded"
    );
}
