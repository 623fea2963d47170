use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use watch_chains::AlloyReader;
use watch_config::ConfigLoader;
use watch_core::{ConsoleReporter, PollLoop, TokioScheduler};
use watch_types::{PoolOrientation, WatchConfig};

mod cli;

use cli::{Cli, Command, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	// Logs go to stderr; stdout carries the report lines
	setup_tracing(&cli.log_level, cli.log_format)?;

	match cli.command {
		Some(Command::Run) | None => run(cli).await,
		Some(Command::Validate) => validate_config(&cli),
	}
}

async fn run(cli: Cli) -> Result<()> {
	info!("Starting OracleWatch");

	let config = load_config(&cli)?;

	let reader = AlloyReader::connect(&config.rpc_url)
		.await
		.context("Could not connect to the RPC node")?;

	let mut poller = PollLoop::new(
		&config,
		Arc::new(reader),
		TokioScheduler,
		ConsoleReporter::stdout(),
	);
	if cli.once {
		poller = poller.with_max_cycles(1);
	}

	poller.announce();
	let cycles = poller.run(shutdown_signal()).await;

	info!(cycles, "OracleWatch stopped");
	Ok(())
}

fn validate_config(cli: &Cli) -> Result<()> {
	let config = load_config(cli)?;

	println!("Configuration is valid");
	println!("RPC endpoint: {}", config.rpc_url);
	println!("Threshold: {}%", config.runtime.threshold_percent);
	println!(
		"Poll interval: {}s",
		config.runtime.poll_interval.as_secs()
	);
	println!("Symbols:");
	for symbol in &config.symbols {
		let token_reserve = match symbol.orientation {
			PoolOrientation::TokenIsReserve0 => "reserve0",
			PoolOrientation::TokenIsReserve1 => "reserve1",
		};
		println!(
			"  {}: aggregator={} pool={} token={}",
			symbol.symbol, symbol.aggregator, symbol.pool, token_reserve
		);
	}

	Ok(())
}

fn load_config(cli: &Cli) -> Result<WatchConfig> {
	let mut loader = ConfigLoader::new();
	if let Some(path) = &cli.config {
		loader = loader.with_file(path);
	}

	loader.load().context("Invalid configuration")
}

fn setup_tracing(log_level: &str, format: LogFormat) -> Result<()> {
	let env_filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(log_level)
			.with_context(|| format!("Invalid log level: {}", log_level))?,
	};

	let registry = tracing_subscriber::registry().with(env_filter);

	let initialized = match format {
		LogFormat::Text => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init(),
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.try_init(),
	};

	initialized.context("Failed to initialize tracing")
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			warn!(error = %e, "Failed to listen for Ctrl+C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				warn!(error = %e, "Failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
