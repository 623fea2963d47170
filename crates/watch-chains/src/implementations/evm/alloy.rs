//! Alloy-based EVM contract reader.
//!
//! Wraps an HTTP `RootProvider`. No wallet or fillers are attached since the
//! watch never sends transactions.

use crate::{ChainError, ContractReader};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tracing::info;

/// Read-only EVM client over JSON-RPC HTTP.
pub struct AlloyReader {
	/// The Alloy provider for blockchain interaction.
	provider: RootProvider,
	/// Chain id reported by the endpoint at connection time.
	chain_id: u64,
}

impl AlloyReader {
	/// Connects to the endpoint and checks that it answers `eth_chainId`.
	///
	/// There is no retry: an unreachable endpoint is a startup failure.
	pub async fn connect(rpc_url: &str) -> Result<Self, ChainError> {
		let provider = RootProvider::new_http(
			rpc_url
				.parse()
				.map_err(|e| ChainError::Connection(format!("Invalid RPC URL: {}", e)))?,
		);

		let chain_id = provider.get_chain_id().await.map_err(|e| {
			ChainError::Connection(format!("Failed to connect to RPC node: {}", e))
		})?;

		info!(chain_id, "Connected to RPC node");

		Ok(Self { provider, chain_id })
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}
}

#[async_trait]
impl ContractReader for AlloyReader {
	async fn call(&self, address: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
		let request = TransactionRequest::default()
			.with_to(address)
			.with_input(calldata);

		self.provider
			.call(request)
			.await
			.map_err(|e| ChainError::Rpc(format!("eth_call to {} failed: {}", address, e)))
	}
}
