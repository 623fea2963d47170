//! Relative deviation between the two price sources.

use rust_decimal::Decimal;
use thiserror::Error;
use watch_types::{DeviationResult, OraclePrice, PoolPrice, Status};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviationError {
	#[error("oracle price is zero, deviation is undefined")]
	ZeroOraclePrice,
	#[error("deviation between {oracle} and {pool} is out of range")]
	Overflow { oracle: Decimal, pool: Decimal },
}

/// Computes `|pool - oracle| / oracle * 100` and classifies it.
///
/// Only a deviation strictly below the threshold is `Ok`; reaching it is an alert.
pub fn evaluate(
	oracle: OraclePrice,
	pool: PoolPrice,
	threshold_percent: Decimal,
) -> Result<DeviationResult, DeviationError> {
	if oracle.value().is_zero() {
		return Err(DeviationError::ZeroOraclePrice);
	}

	let overflow = || DeviationError::Overflow {
		oracle: oracle.value(),
		pool: pool.value(),
	};

	let deviation_percent = pool
		.value()
		.checked_sub(oracle.value())
		.map(|diff| diff.abs())
		.and_then(|diff| diff.checked_div(oracle.value()))
		.and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
		.ok_or_else(overflow)?;

	let status = if deviation_percent < threshold_percent {
		Status::Ok
	} else {
		Status::Alert
	};

	Ok(DeviationResult {
		deviation_percent,
		status,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	fn check(oracle: Decimal, pool: Decimal, threshold: Decimal) -> DeviationResult {
		evaluate(OraclePrice(oracle), PoolPrice(pool), threshold).unwrap()
	}

	#[test]
	fn test_equal_prices_are_ok() {
		let result = check(dec!(1), dec!(1), dec!(1.0));
		assert_eq!(result.deviation_percent, dec!(0));
		assert_eq!(result.status, Status::Ok);
	}

	#[test]
	fn test_pool_above_oracle_alerts() {
		let result = check(dec!(1), dec!(1.05), dec!(1.0));
		assert_eq!(result.deviation_percent, dec!(5));
		assert_eq!(result.status, Status::Alert);
	}

	#[test]
	fn test_deviation_is_symmetric_in_sign() {
		let below = check(dec!(2000), dec!(1990), dec!(1.0));
		let above = check(dec!(2000), dec!(2010), dec!(1.0));
		assert_eq!(below.deviation_percent, dec!(0.5));
		assert_eq!(above.deviation_percent, dec!(0.5));
		assert_eq!(below.status, Status::Ok);
	}

	#[test]
	fn test_exactly_at_threshold_is_alert() {
		let result = check(dec!(100), dec!(101), dec!(1.0));
		assert_eq!(result.deviation_percent, dec!(1));
		assert_eq!(result.status, Status::Alert);
	}

	#[test]
	fn test_just_below_threshold_is_ok() {
		let result = check(dec!(100), dec!(100.99), dec!(1.0));
		assert_eq!(result.status, Status::Ok);
	}

	#[test]
	fn test_zero_threshold_alerts_on_any_difference() {
		assert_eq!(check(dec!(1), dec!(1), dec!(0)).status, Status::Alert);
		assert_eq!(check(dec!(1), dec!(1.000001), dec!(0)).status, Status::Alert);
	}

	#[test]
	fn test_zero_oracle_price() {
		let result = evaluate(OraclePrice(dec!(0)), PoolPrice(dec!(1)), dec!(1.0));
		assert_eq!(result, Err(DeviationError::ZeroOraclePrice));
	}

	#[test]
	fn test_overflow_is_error() {
		let result = evaluate(OraclePrice(dec!(0.0000000001)), PoolPrice(Decimal::MAX), dec!(1.0));
		assert!(matches!(result, Err(DeviationError::Overflow { .. })));
	}
}
