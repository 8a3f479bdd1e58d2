//! Log subscriber setup

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::RuntimeConfig;

/// Install the global subscriber. Logs go to stderr; stdout carries the
/// outbound transport.
pub fn init_tracing(config: &RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;

    let json = config
        .log_json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain = (!config.log_json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()?;
    Ok(())
}
