//! Shared types for the oracle watch.
//!
//! Everything here is transient: configuration is built once at startup and
//! every price value is recomputed on each poll cycle and then discarded.

pub mod config;
pub mod prices;

pub use config::{PoolOrientation, RuntimeConfig, SymbolConfig, WatchConfig};
pub use prices::{DeviationResult, OraclePrice, PoolPrice, PoolReserves, Status};

/// Account address type used for aggregator and pool contracts.
pub use alloy::primitives::Address;
