use dnssec_monitor_domain::config::AnchorConfig;
use dnssec_monitor_domain::{AnchorKind, ConfigError, TrustAnchor};
use dnssec_monitor_infrastructure::dns::dnssec::TrustAnchorLoader;
use tracing::warn;

/// Loads the DLV anchor when one is configured, the root anchor otherwise
pub fn load_anchor(config: &AnchorConfig) -> anyhow::Result<TrustAnchor> {
    match (config.dlvkey.as_deref(), config.rootkey.as_deref()) {
        (Some(dlvkey), rootkey) => {
            if let Some(rootkey) = rootkey {
                warn!(
                    rootkey = %rootkey,
                    dlvkey = %dlvkey,
                    "Both trust anchors given, using the DLV anchor"
                );
            }
            Ok(TrustAnchorLoader::load(dlvkey, AnchorKind::Dlv)?)
        }
        (None, Some(rootkey)) => Ok(TrustAnchorLoader::load(rootkey, AnchorKind::Root)?),
        (None, None) => Err(ConfigError::MissingTrustAnchor.into()),
    }
}
