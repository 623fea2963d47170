//! Read-only access to an EVM ledger.
//!
//! The watch only ever needs one operation from the node: an `eth_call` against
//! a contract at the latest block. That operation sits behind the
//! `ContractReader` trait so the price fetchers and the poll loop can be driven
//! by an in-memory reader in tests.
//!
//! - `implementations::evm`: the alloy HTTP reader used in production
//! - `call_view`: typed helper that ABI-encodes a `sol!` call and decodes its return

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod implementations;

pub use implementations::evm::AlloyReader;

/// Errors raised while talking to the node.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The endpoint could not be reached or the URL is invalid.
	#[error("Connection error: {0}")]
	Connection(String),
	/// Transport failure, RPC error response or reverted call.
	#[error("RPC error: {0}")]
	Rpc(String),
	/// The call returned data that does not match the expected ABI.
	#[error("Decode error: {0}")]
	Decode(String),
}

/// Capability to perform read-only contract calls.
#[async_trait]
pub trait ContractReader: Send + Sync {
	/// Executes `eth_call` with the given calldata and returns the raw return data.
	async fn call(&self, address: Address, calldata: Bytes) -> Result<Bytes, ChainError>;
}

/// Calls a view function described by a `sol!` call type and decodes its return value.
pub async fn call_view<C>(
	reader: &dyn ContractReader,
	address: Address,
	call: C,
) -> Result<C::Return, ChainError>
where
	C: SolCall + Send,
{
	debug!(%address, function = C::SIGNATURE, "Calling view function");

	let output = reader.call(address, Bytes::from(call.abi_encode())).await?;

	C::abi_decode_returns(&output)
		.map_err(|e| ChainError::Decode(format!("{} on {}: {}", C::SIGNATURE, address, e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::U256;
	use alloy::sol;

	sol! {
		function decimals() external view returns (uint8);
	}

	struct FixedReader {
		output: Result<Vec<u8>, String>,
	}

	#[async_trait]
	impl ContractReader for FixedReader {
		async fn call(&self, _address: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
			assert_eq!(&calldata[..4], &decimalsCall::SELECTOR[..]);
			self.output
				.clone()
				.map(Bytes::from)
				.map_err(ChainError::Rpc)
		}
	}

	#[tokio::test]
	async fn test_call_view_decodes_return() {
		let reader = FixedReader {
			output: Ok(U256::from(8u8).to_be_bytes::<32>().to_vec()),
		};

		let decimals = call_view(&reader, Address::ZERO, decimalsCall {})
			.await
			.unwrap();
		assert_eq!(decimals, 8);
	}

	#[tokio::test]
	async fn test_call_view_empty_output_is_decode_error() {
		// Calling an address without code returns empty data.
		let reader = FixedReader { output: Ok(vec![]) };

		let result = call_view(&reader, Address::ZERO, decimalsCall {}).await;
		assert!(matches!(result, Err(ChainError::Decode(_))));
	}

	#[tokio::test]
	async fn test_call_view_propagates_rpc_error() {
		let reader = FixedReader {
			output: Err("connection refused".to_string()),
		};

		let err = call_view(&reader, Address::ZERO, decimalsCall {})
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "RPC error: connection refused");
	}
}
