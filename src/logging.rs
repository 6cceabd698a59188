use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::{SubTrackConfig, SubTrackError};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// The terminal belongs to the table while it runs, so interactive sessions
/// log into `config.log_file`. With `to_stderr` the log goes to stderr instead.
pub fn init(config: &SubTrackConfig, to_stderr: bool) -> Result<(), SubTrackError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default());

    let result = if to_stderr {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        registry
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .try_init()
    };

    result.map_err(|e| SubTrackError::InvalidConfiguration(format!("logging: {e}")))
}
