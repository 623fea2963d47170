//! Price fetchers for the two sources compared by the watch.
//!
//! - Chainlink-style aggregators: `decimals()` and `latestAnswer()`
//! - Uniswap-V2-style pairs: `getReserves()`
//!
//! Both fetchers go through a `ContractReader` and pass its failures through
//! unchanged; callers decide what a failed fetch means.

use thiserror::Error;
use watch_chains::ChainError;

pub mod implementations;

pub use implementations::chainlink::fetch_oracle_price;
pub use implementations::uniswap_v2::{fetch_pool_price, fetch_reserves, pool_price};

/// Errors returned by the price fetchers.
#[derive(Debug, Error)]
pub enum OracleError {
	/// The underlying contract call failed.
	#[error(transparent)]
	Chain(#[from] ChainError),
	/// The on-chain value cannot be represented as a decimal price.
	#[error("Conversion error: {0}")]
	Conversion(String),
}
