//! Price values produced by one poll cycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Asset price reported by an aggregator, already scaled by its `decimals()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OraclePrice(pub Decimal);

/// Asset price implied by a pool's reserves, expressed in the numeraire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PoolPrice(pub Decimal);

impl OraclePrice {
	pub fn value(&self) -> Decimal {
		self.0
	}
}

impl PoolPrice {
	pub fn value(&self) -> Decimal {
		self.0
	}
}

/// Raw reserves read from a pair's `getReserves()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
	pub reserve0: u128,
	pub reserve1: u128,
	/// Block timestamp of the last reserve update, when representable.
	pub last_updated: Option<DateTime<Utc>>,
}

impl PoolReserves {
	/// A pool with either side empty has no meaningful price.
	pub fn is_empty(&self) -> bool {
		self.reserve0 == 0 || self.reserve1 == 0
	}
}

/// Classification of a deviation against the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
	Ok,
	Alert,
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Ok => write!(f, "OK"),
			Status::Alert => write!(f, "ALERT"),
		}
	}
}

/// Relative deviation between the pool and oracle prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviationResult {
	/// `|pool - oracle| / oracle * 100`.
	pub deviation_percent: Decimal,
	pub status: Status,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_display() {
		assert_eq!(Status::Ok.to_string(), "OK");
		assert_eq!(Status::Alert.to_string(), "ALERT");
	}

	#[test]
	fn test_reserves_empty_when_either_side_is_zero() {
		let reserves = |reserve0, reserve1| PoolReserves {
			reserve0,
			reserve1,
			last_updated: None,
		};

		assert!(reserves(0, 1000).is_empty());
		assert!(reserves(1000, 0).is_empty());
		assert!(reserves(0, 0).is_empty());
		assert!(!reserves(1000, 1050).is_empty());
	}
}
