pub mod anchor;
pub mod clock;
pub mod config;
pub mod logging;

pub use anchor::load_anchor;
pub use clock::resolve_now;
pub use config::load_config;
pub use logging::init_logging;
