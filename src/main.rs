//! `api-composer` binary: loads configuration, installs logging, and serves the composed endpoint.

// std
use std::{path::PathBuf, sync::Arc};
// crates.io
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
// self
use api_composer::{config::ComposerConfig, server, telemetry};

#[derive(Debug, Parser)]
#[command(
	name = "api-composer",
	version,
	about = "Serve the composed, Hawk-signed two-source search."
)]
struct Cli {
	/// Configuration file; `api-composer.toml` is read when present and this is unset.
	#[arg(long, env = "API_COMPOSER_CONFIG")]
	config: Option<PathBuf>,
	/// Overrides `server.bind`.
	#[arg(long)]
	bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();
	let mut config =
		ComposerConfig::load(cli.config.as_deref()).wrap_err("Failed to load configuration.")?;

	if let Some(bind) = cli.bind {
		config.server.bind = bind;
	}

	telemetry::init(&config.telemetry)?;

	let composer = Arc::new(config.build_composer()?);
	let listener = tokio::net::TcpListener::bind(&config.server.bind)
		.await
		.wrap_err_with(|| format!("Failed to bind `{}`.", config.server.bind))?;

	tracing::info!(bind = %config.server.bind, "api-composer listening");

	axum::serve(listener, server::router(composer))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	tracing::info!("api-composer stopped");

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "failed to listen for shutdown signal");

		std::future::pending::<()>().await;
	}
}
