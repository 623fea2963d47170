//! Configuration loading from files and environment.

use crate::types::{FileConfig, FileSymbol};
use crate::ConfigError;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use watch_types::config::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_THRESHOLD_PERCENT};
use watch_types::{Address, PoolOrientation, RuntimeConfig, SymbolConfig, WatchConfig};

pub const RPC_URL_VAR: &str = "ETH_RPC_URL";
pub const SYMBOLS_VAR: &str = "SYMBOLS";
pub const AGGREGATORS_VAR: &str = "AGGREGATOR_ADDRESSES";
pub const POOLS_VAR: &str = "POOL_ADDRESSES";
pub const THRESHOLD_VAR: &str = "THRESHOLD_PERCENT";
pub const POLL_INTERVAL_VAR: &str = "POLL_INTERVAL";
pub const INVERTED_SYMBOLS_VAR: &str = "INVERTED_SYMBOLS";

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration loader
///
/// Environment variables win over file values; the symbol set is taken whole
/// from one source, never merged.
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env: EnvLookup,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	/// Loader reading the process environment and no file.
	pub fn new() -> Self {
		Self {
			file_path: None,
			env: Box::new(|key: &str| std::env::var(key).ok()),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	/// Reads variables from the given pairs instead of the process environment.
	pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let vars: HashMap<String, String> = vars
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect();
		self.env = Box::new(move |key: &str| vars.get(key).cloned());
		self
	}

	/// Builds and validates the complete configuration.
	pub fn load(&self) -> Result<WatchConfig, ConfigError> {
		let file = match &self.file_path {
			Some(path) => Self::from_file(path)?,
			None => FileConfig::default(),
		};

		let rpc_url = self
			.var(RPC_URL_VAR)
			.or_else(|| non_empty(file.rpc_url))
			.ok_or_else(|| ConfigError::MissingSetting(RPC_URL_VAR.to_string()))?;

		let mut symbols = if self.has_symbol_lists() {
			debug!("Reading symbols from environment");
			self.symbols_from_env()?
		} else {
			Self::symbols_from_file(&file.symbols)?
		};

		if symbols.is_empty() {
			return Err(ConfigError::MissingSetting(SYMBOLS_VAR.to_string()));
		}

		if let Some(inverted) = self.var(INVERTED_SYMBOLS_VAR) {
			apply_inversions(&mut symbols, &inverted)?;
		}

		ensure_unique(&symbols)?;

		let runtime = RuntimeConfig {
			threshold_percent: self.threshold(file.threshold_percent)?,
			poll_interval: Duration::from_secs(self.poll_interval(file.poll_interval_secs)?),
		};

		info!(
			symbols = symbols.len(),
			threshold_percent = %runtime.threshold_percent,
			poll_interval_secs = runtime.poll_interval.as_secs(),
			"Configuration loaded"
		);

		Ok(WatchConfig {
			rpc_url,
			symbols,
			runtime,
		})
	}

	/// Parses a config file, picking the format from its extension.
	pub fn from_file(path: &Path) -> Result<FileConfig, ConfigError> {
		info!("Loading configuration from {:?}", path);

		let format = path.extension().and_then(|s| s.to_str());
		if !matches!(format, Some("toml" | "json" | "yaml" | "yml")) {
			return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
		}

		let contents = std::fs::read_to_string(path)?;

		match format {
			Some("toml") => toml::from_str(&contents)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e))),
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e))),
			_ => serde_yaml::from_str(&contents)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e))),
		}
	}

	/// Non-empty, trimmed value of an environment variable.
	fn var(&self, key: &str) -> Option<String> {
		non_empty((self.env)(key))
	}

	fn required(&self, key: &str) -> Result<String, ConfigError> {
		self.var(key)
			.ok_or_else(|| ConfigError::MissingSetting(key.to_string()))
	}

	fn has_symbol_lists(&self) -> bool {
		[SYMBOLS_VAR, AGGREGATORS_VAR, POOLS_VAR]
			.iter()
			.any(|key| self.var(key).is_some())
	}

	fn symbols_from_env(&self) -> Result<Vec<SymbolConfig>, ConfigError> {
		let names = split_list(&self.required(SYMBOLS_VAR)?);
		let aggregators = split_list(&self.required(AGGREGATORS_VAR)?);
		let pools = split_list(&self.required(POOLS_VAR)?);

		if names.len() != aggregators.len() || names.len() != pools.len() {
			return Err(ConfigError::LengthMismatch {
				symbols: names.len(),
				aggregators: aggregators.len(),
				pools: pools.len(),
			});
		}

		names
			.into_iter()
			.zip(aggregators)
			.zip(pools)
			.map(|((name, aggregator), pool)| -> Result<SymbolConfig, ConfigError> {
				Ok(SymbolConfig::new(
					parse_symbol(SYMBOLS_VAR, name)?,
					parse_address(AGGREGATORS_VAR, aggregator)?,
					parse_address(POOLS_VAR, pool)?,
				))
			})
			.collect()
	}

	fn symbols_from_file(entries: &[FileSymbol]) -> Result<Vec<SymbolConfig>, ConfigError> {
		entries
			.iter()
			.enumerate()
			.map(|(i, entry)| -> Result<SymbolConfig, ConfigError> {
				let orientation = if entry.invert {
					PoolOrientation::TokenIsReserve1
				} else {
					PoolOrientation::TokenIsReserve0
				};

				Ok(SymbolConfig::new(
					parse_symbol(&format!("symbols[{}].symbol", i), entry.symbol.trim())?,
					parse_address(&format!("symbols[{}].aggregator", i), entry.aggregator.trim())?,
					parse_address(&format!("symbols[{}].pool", i), entry.pool.trim())?,
				)
				.with_orientation(orientation))
			})
			.collect()
	}

	fn threshold(&self, from_file: Option<Decimal>) -> Result<Decimal, ConfigError> {
		let threshold = match self.var(THRESHOLD_VAR) {
			Some(value) => Decimal::from_str(&value).map_err(|e| ConfigError::InvalidValue {
				setting: THRESHOLD_VAR.to_string(),
				value: value.clone(),
				reason: e.to_string(),
			})?,
			None => from_file.unwrap_or(DEFAULT_THRESHOLD_PERCENT),
		};

		if threshold.is_sign_negative() && !threshold.is_zero() {
			return Err(ConfigError::InvalidValue {
				setting: THRESHOLD_VAR.to_string(),
				value: threshold.to_string(),
				reason: "threshold must not be negative".to_string(),
			});
		}

		Ok(threshold)
	}

	fn poll_interval(&self, from_file: Option<u64>) -> Result<u64, ConfigError> {
		let (seconds, raw) = match self.var(POLL_INTERVAL_VAR) {
			Some(value) => {
				let seconds = value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
					setting: POLL_INTERVAL_VAR.to_string(),
					value: value.clone(),
					reason: e.to_string(),
				})?;
				(seconds, value)
			}
			None => {
				let seconds = from_file.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
				(seconds, seconds.to_string())
			}
		};

		if seconds == 0 {
			return Err(ConfigError::InvalidValue {
				setting: POLL_INTERVAL_VAR.to_string(),
				value: raw,
				reason: "poll interval must be at least one second".to_string(),
			});
		}

		Ok(seconds)
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
	value.split(',').map(|item| item.trim().to_string()).collect()
}

fn parse_symbol(setting: &str, name: impl Into<String>) -> Result<String, ConfigError> {
	let name = name.into();
	if name.is_empty() {
		return Err(ConfigError::InvalidValue {
			setting: setting.to_string(),
			value: name,
			reason: "symbol name must not be empty".to_string(),
		});
	}
	Ok(name)
}

fn parse_address(setting: &str, value: impl Into<String>) -> Result<Address, ConfigError> {
	let value = value.into();
	Address::from_str(&value).map_err(|e| ConfigError::InvalidAddress {
		setting: setting.to_string(),
		value: value.clone(),
		reason: e.to_string(),
	})
}

fn apply_inversions(symbols: &mut [SymbolConfig], inverted: &str) -> Result<(), ConfigError> {
	for name in split_list(inverted) {
		let symbol = symbols
			.iter_mut()
			.find(|s| s.symbol == name)
			.ok_or_else(|| ConfigError::UnknownSymbol {
				setting: INVERTED_SYMBOLS_VAR.to_string(),
				symbol: name.clone(),
			})?;
		symbol.orientation = PoolOrientation::TokenIsReserve1;
	}
	Ok(())
}

fn ensure_unique(symbols: &[SymbolConfig]) -> Result<(), ConfigError> {
	let mut seen = HashSet::new();
	for symbol in symbols {
		if !seen.insert(symbol.symbol.as_str()) {
			return Err(ConfigError::DuplicateSymbol(symbol.symbol.clone()));
		}
	}
	Ok(())
}
