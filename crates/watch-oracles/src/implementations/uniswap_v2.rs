//! Uniswap-V2 pair price source.

use crate::OracleError;
use alloy::primitives::Address;
use alloy::sol;
use chrono::DateTime;
use rust_decimal::Decimal;
use tracing::debug;
use watch_chains::{call_view, ContractReader};
use watch_types::{PoolOrientation, PoolPrice, PoolReserves};

sol! {
	/// Pair view functions used by the watch.
	interface IUniswapV2Pair {
		function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
	}
}

/// Largest integer a `Decimal` can hold at scale zero (2^96 - 1).
const DECIMAL_MAX_MANTISSA: u128 = (1 << 96) - 1;

/// Reads the current reserves of a pair.
pub async fn fetch_reserves(
	reader: &dyn ContractReader,
	pool: Address,
) -> Result<PoolReserves, OracleError> {
	let reserves = call_view(reader, pool, IUniswapV2Pair::getReservesCall {}).await?;

	Ok(PoolReserves {
		reserve0: reserves.reserve0.to::<u128>(),
		reserve1: reserves.reserve1.to::<u128>(),
		last_updated: DateTime::from_timestamp(i64::from(reserves.blockTimestampLast), 0),
	})
}

/// Reads a pair's reserves and derives the token price in the numeraire.
///
/// Returns `Ok(None)` when either reserve is zero.
pub async fn fetch_pool_price(
	reader: &dyn ContractReader,
	pool: Address,
	orientation: PoolOrientation,
) -> Result<Option<PoolPrice>, OracleError> {
	let reserves = fetch_reserves(reader, pool).await?;

	debug!(
		%pool,
		reserve0 = reserves.reserve0,
		reserve1 = reserves.reserve1,
		last_updated = ?reserves.last_updated,
		"Read pool reserves"
	);

	pool_price(&reserves, orientation)
}

/// Price of the pooled token expressed in the numeraire, `numeraire / token`.
pub fn pool_price(
	reserves: &PoolReserves,
	orientation: PoolOrientation,
) -> Result<Option<PoolPrice>, OracleError> {
	if reserves.is_empty() {
		return Ok(None);
	}

	let (token, numeraire) = match orientation {
		PoolOrientation::TokenIsReserve0 => (reserves.reserve0, reserves.reserve1),
		PoolOrientation::TokenIsReserve1 => (reserves.reserve1, reserves.reserve0),
	};

	let (token, numeraire) = rescale(token, numeraire);
	if token == 0 {
		return Err(OracleError::Conversion(format!(
			"pool price for reserves ({}, {}) is out of range",
			reserves.reserve0, reserves.reserve1
		)));
	}

	to_decimal(numeraire)?
		.checked_div(to_decimal(token)?)
		.map(|price| Some(PoolPrice(price)))
		.ok_or_else(|| {
			OracleError::Conversion(format!(
				"pool price for reserves ({}, {}) is out of range",
				reserves.reserve0, reserves.reserve1
			))
		})
}

/// Drops the same number of trailing digits from both reserves until they fit a `Decimal`.
/// Uint112 reserves can exceed the 96-bit mantissa; the ratio is kept.
fn rescale(mut token: u128, mut numeraire: u128) -> (u128, u128) {
	while token > DECIMAL_MAX_MANTISSA || numeraire > DECIMAL_MAX_MANTISSA {
		token /= 10;
		numeraire /= 10;
	}
	(token, numeraire)
}

fn to_decimal(value: u128) -> Result<Decimal, OracleError> {
	i128::try_from(value)
		.ok()
		.and_then(|value| Decimal::try_from_i128_with_scale(value, 0).ok())
		.ok_or_else(|| OracleError::Conversion(format!("reserve {} is out of range", value)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::{Bytes, U256};
	use async_trait::async_trait;
	use rust_decimal_macros::dec;
	use watch_chains::ChainError;

	struct MockPair {
		reserves: Result<(u128, u128, u32), String>,
	}

	#[async_trait]
	impl ContractReader for MockPair {
		async fn call(&self, _address: Address, _calldata: Bytes) -> Result<Bytes, ChainError> {
			let (reserve0, reserve1, timestamp) =
				self.reserves.clone().map_err(ChainError::Rpc)?;
			let mut output = Vec::with_capacity(96);
			for word in [
				U256::from(reserve0),
				U256::from(reserve1),
				U256::from(timestamp),
			] {
				output.extend_from_slice(&word.to_be_bytes::<32>());
			}
			Ok(Bytes::from(output))
		}
	}

	fn reserves(reserve0: u128, reserve1: u128) -> PoolReserves {
		PoolReserves {
			reserve0,
			reserve1,
			last_updated: None,
		}
	}

	#[tokio::test]
	async fn test_fetch_reserves_decodes_all_fields() {
		let reader = MockPair {
			reserves: Ok((1000, 1050, 1_700_000_000)),
		};

		let result = fetch_reserves(&reader, Address::ZERO).await.unwrap();
		assert_eq!(result.reserve0, 1000);
		assert_eq!(result.reserve1, 1050);
		assert_eq!(
			result.last_updated.map(|t| t.timestamp()),
			Some(1_700_000_000)
		);
	}

	#[tokio::test]
	async fn test_pool_price_is_reserve1_over_reserve0() {
		let reader = MockPair {
			reserves: Ok((1000, 1050, 0)),
		};

		let price = fetch_pool_price(&reader, Address::ZERO, PoolOrientation::default())
			.await
			.unwrap();
		assert_eq!(price, Some(PoolPrice(dec!(1.05))));
	}

	#[tokio::test]
	async fn test_zero_reserve_means_no_price() {
		let reader = MockPair {
			reserves: Ok((0, 1000, 0)),
		};

		let price = fetch_pool_price(&reader, Address::ZERO, PoolOrientation::default())
			.await
			.unwrap();
		assert_eq!(price, None);
	}

	#[tokio::test]
	async fn test_call_failure_propagates() {
		let reader = MockPair {
			reserves: Err("connection reset".to_string()),
		};

		let err = fetch_pool_price(&reader, Address::ZERO, PoolOrientation::default())
			.await
			.unwrap_err();
		assert!(matches!(err, OracleError::Chain(ChainError::Rpc(_))));
	}

	#[test]
	fn test_inverted_orientation() {
		let price = pool_price(&reserves(2000, 1000), PoolOrientation::TokenIsReserve1).unwrap();
		assert_eq!(price, Some(PoolPrice(dec!(2))));
	}

	#[test]
	fn test_either_zero_reserve_is_absent() {
		assert_eq!(pool_price(&reserves(1000, 0), PoolOrientation::default()).unwrap(), None);
		assert_eq!(pool_price(&reserves(0, 0), PoolOrientation::default()).unwrap(), None);
	}

	#[test]
	fn test_wei_scale_reserves() {
		// 2,000,000 USDC (6 decimals) against 1,000 WETH (18 decimals).
		let price = pool_price(
			&reserves(2_000_000_000_000, 1_000_000_000_000_000_000_000),
			PoolOrientation::default(),
		)
		.unwrap();
		assert_eq!(price, Some(PoolPrice(dec!(500000000))));
	}

	#[test]
	fn test_reserves_beyond_decimal_range_keep_ratio() {
		let max_uint112 = (1u128 << 112) - 1;
		let price = pool_price(&reserves(max_uint112, max_uint112), PoolOrientation::default())
			.unwrap()
			.unwrap();
		assert_eq!(price.value(), dec!(1));
	}

	#[test]
	fn test_unrepresentable_ratio_is_conversion_error() {
		let max_uint112 = (1u128 << 112) - 1;
		let result = pool_price(&reserves(1, max_uint112), PoolOrientation::default());
		assert!(matches!(result, Err(OracleError::Conversion(_))));
	}
}
