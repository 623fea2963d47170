//! Command-line interface definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "oracle-watch")]
#[command(about = "Watches Chainlink feeds against Uniswap V2 pool prices", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Optional TOML/JSON/YAML file; environment variables override it
	#[arg(short, long, value_name = "FILE", env = "ORACLE_WATCH_CONFIG")]
	pub config: Option<PathBuf>,

	/// Log level or filter directive, ignored when RUST_LOG is set
	#[arg(long, env = "ORACLE_WATCH_LOG_LEVEL", default_value = "info")]
	pub log_level: String,

	/// Log output format
	#[arg(long, value_enum, default_value_t = LogFormat::Text)]
	pub log_format: LogFormat,

	/// Run a single poll cycle and exit
	#[arg(long)]
	pub once: bool,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Start watching (default)
	Run,
	/// Validate the configuration without connecting to the node
	Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
	Text,
	Json,
}
