//! Logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter directives used when `RUST_LOG` is not set
pub fn default_directives(config: &LoggingConfig) -> String {
    format!("nourish={},tower_http=debug", config.level)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. `format = "json"` emits one
/// JSON object per line; anything else uses the human-readable formatter.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    }
}
