//! Configuration loading for the oracle watch.
//!
//! Settings come from the process environment, optionally layered over a
//! TOML/JSON/YAML file. Anything missing or inconsistent is reported as a
//! `ConfigError`; the binary treats every such error as fatal.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{FileConfig, FileSymbol};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Missing required setting: {0}")]
	MissingSetting(String),

	#[error(
		"SYMBOLS, AGGREGATOR_ADDRESSES and POOL_ADDRESSES must have the same length \
		 (got {symbols}, {aggregators} and {pools})"
	)]
	LengthMismatch {
		symbols: usize,
		aggregators: usize,
		pools: usize,
	},

	#[error("Invalid address '{value}' in {setting}: {reason}")]
	InvalidAddress {
		setting: String,
		value: String,
		reason: String,
	},

	#[error("Invalid value '{value}' for {setting}: {reason}")]
	InvalidValue {
		setting: String,
		value: String,
		reason: String,
	},

	#[error("Duplicate symbol: {0}")]
	DuplicateSymbol(String),

	#[error("Unknown symbol '{symbol}' in {setting}")]
	UnknownSymbol { setting: String, symbol: String },

	#[error("Unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
