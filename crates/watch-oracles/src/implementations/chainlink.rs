//! Chainlink aggregator price source.

use crate::OracleError;
use alloy::primitives::{Address, I256};
use alloy::sol;
use rust_decimal::Decimal;
use tracing::debug;
use watch_chains::{call_view, ContractReader};
use watch_types::OraclePrice;

sol! {
	/// Aggregator view functions used by the watch.
	interface IAggregator {
		function decimals() external view returns (uint8);
		function latestAnswer() external view returns (int256);
	}
}

/// Reads the latest answer of an aggregator and scales it by the feed's decimals.
///
/// Negative and stale answers are returned as-is.
pub async fn fetch_oracle_price(
	reader: &dyn ContractReader,
	aggregator: Address,
) -> Result<OraclePrice, OracleError> {
	let decimals = call_view(reader, aggregator, IAggregator::decimalsCall {}).await?;
	let answer = call_view(reader, aggregator, IAggregator::latestAnswerCall {}).await?;

	debug!(%aggregator, %answer, decimals, "Read aggregator answer");

	scale_answer(answer, decimals)
}

fn scale_answer(answer: I256, decimals: u8) -> Result<OraclePrice, OracleError> {
	let raw = i128::try_from(answer).map_err(|_| {
		OracleError::Conversion(format!("aggregator answer {} is out of range", answer))
	})?;

	Decimal::try_from_i128_with_scale(raw, u32::from(decimals))
		.map(OraclePrice)
		.map_err(|e| {
			OracleError::Conversion(format!(
				"aggregator answer {} with {} decimals: {}",
				answer, decimals, e
			))
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::{Bytes, U256};
	use alloy::sol_types::SolCall;
	use async_trait::async_trait;
	use rust_decimal_macros::dec;
	use watch_chains::ChainError;

	struct MockAggregator {
		decimals: u8,
		answer: U256,
		fail_answer: bool,
	}

	#[async_trait]
	impl ContractReader for MockAggregator {
		async fn call(&self, _address: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
			let selector = &calldata[..4];
			if selector == &IAggregator::decimalsCall::SELECTOR[..] {
				Ok(Bytes::from(U256::from(self.decimals).to_be_bytes::<32>().to_vec()))
			} else if selector == &IAggregator::latestAnswerCall::SELECTOR[..] {
				if self.fail_answer {
					return Err(ChainError::Rpc("execution reverted".to_string()));
				}
				Ok(Bytes::from(self.answer.to_be_bytes::<32>().to_vec()))
			} else {
				Err(ChainError::Rpc("unknown selector".to_string()))
			}
		}
	}

	fn aggregator(decimals: u8, answer: U256) -> MockAggregator {
		MockAggregator {
			decimals,
			answer,
			fail_answer: false,
		}
	}

	#[tokio::test]
	async fn test_price_scaled_by_decimals() {
		let reader = aggregator(8, U256::from(100_000_000u64));

		let price = fetch_oracle_price(&reader, Address::ZERO).await.unwrap();
		assert_eq!(price, OraclePrice(dec!(1.00000000)));
	}

	#[tokio::test]
	async fn test_eighteen_decimal_feed() {
		let reader = aggregator(18, U256::from(523_400_000_000_000u64));

		let price = fetch_oracle_price(&reader, Address::ZERO).await.unwrap();
		assert_eq!(price.value(), dec!(0.0005234));
	}

	#[tokio::test]
	async fn test_negative_answer_passes_through() {
		// All-ones word is int256 -1.
		let reader = aggregator(0, U256::MAX);

		let price = fetch_oracle_price(&reader, Address::ZERO).await.unwrap();
		assert_eq!(price.value(), dec!(-1));
	}

	#[tokio::test]
	async fn test_call_failure_propagates() {
		let reader = MockAggregator {
			decimals: 8,
			answer: U256::ZERO,
			fail_answer: true,
		};

		let err = fetch_oracle_price(&reader, Address::ZERO).await.unwrap_err();
		assert!(matches!(err, OracleError::Chain(ChainError::Rpc(_))));
		assert_eq!(err.to_string(), "RPC error: execution reverted");
	}

	#[test]
	fn test_answer_beyond_decimal_range_is_conversion_error() {
		let huge = I256::from_raw(U256::from(1u8) << 200);
		assert!(matches!(
			scale_answer(huge, 8),
			Err(OracleError::Conversion(_))
		));
	}

	#[test]
	fn test_scale_beyond_decimal_precision_is_conversion_error() {
		let answer = I256::from_raw(U256::from(1u8));
		assert!(matches!(
			scale_answer(answer, 40),
			Err(OracleError::Conversion(_))
		));
	}
}
