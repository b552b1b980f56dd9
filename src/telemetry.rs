//! Global `tracing` subscriber set-up for the binary.

// crates.io
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{
	config::{LogFormat, TelemetryConfig},
	error::ConfigError,
};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `log_level`.
pub fn init(config: &TelemetryConfig) -> Result<(), ConfigError> {
	let env_filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
			ConfigError::Message(format!("invalid log level `{}`: {e}", config.log_level))
		})?,
	};
	let fmt_layer = match config.log_format {
		LogFormat::Json => fmt::layer().json().with_current_span(true).with_span_list(true).boxed(),
		LogFormat::Pretty => fmt::layer().pretty().boxed(),
	};

	tracing_subscriber::registry()
		.with(env_filter)
		.with(fmt_layer)
		.try_init()
		.map_err(|e| ConfigError::Message(format!("logging already initialized: {e}")))
}
