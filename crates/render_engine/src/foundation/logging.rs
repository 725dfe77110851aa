//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default level
///
/// `RUST_LOG` still overrides the level when it is set.
pub fn init_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
