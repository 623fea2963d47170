//! Console report lines.
//!
//! The line formats are stable; scripts scraping the output depend on them.

use rust_decimal::Decimal;
use std::fmt;
use std::io::{self, Write};
use tracing::warn;
use watch_types::{DeviationResult, OraclePrice, PoolPrice};

/// Label of the numeraire asset printed after each price.
pub const NUMERAIRE_LABEL: &str = "ETH";

/// One item of user-facing output.
#[derive(Debug, Clone, PartialEq)]
pub enum Report<'a> {
	/// Printed once at startup, followed by an empty line.
	Banner { threshold_percent: Decimal },
	/// Both prices were read and compared.
	Priced {
		symbol: &'a str,
		oracle: OraclePrice,
		pool: PoolPrice,
		deviation: DeviationResult,
	},
	/// The pool has an empty reserve.
	NoReserves { symbol: &'a str },
	/// A fetch or evaluation failed for this symbol.
	Failed { symbol: &'a str, message: String },
	/// Empty separator line after each cycle.
	CycleEnd,
}

impl fmt::Display for Report<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Report::Banner { threshold_percent } => writeln!(
				f,
				"OracleWatch started. Deviation threshold {}%",
				threshold_percent
			),
			Report::Priced {
				symbol,
				oracle,
				pool,
				deviation,
			} => write!(
				f,
				"{}: Oracle={} {label}  DEX={} {label}  Δ={}% → {}",
				symbol,
				fixed(oracle.value(), 6),
				fixed(pool.value(), 6),
				fixed(deviation.deviation_percent, 2),
				deviation.status,
				label = NUMERAIRE_LABEL,
			),
			Report::NoReserves { symbol } => write!(f, "{}: could not get pool reserves", symbol),
			Report::Failed { symbol, message } => {
				write!(f, "{}: error fetching data: {}", symbol, message)
			}
			Report::CycleEnd => Ok(()),
		}
	}
}

/// Rounds half-to-even and pads to exactly `dp` decimal places.
fn fixed(value: Decimal, dp: u32) -> String {
	format!("{:.*}", dp as usize, value.round_dp(dp))
}

/// Sink for report lines.
pub trait Reporter: Send {
	fn report(&mut self, report: &Report<'_>);
}

/// Writes each report as one line to a writer, stdout in production.
pub struct ConsoleReporter<W: Write + Send> {
	out: W,
}

impl ConsoleReporter<io::Stdout> {
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write + Send> ConsoleReporter<W> {
	pub fn new(out: W) -> Self {
		Self { out }
	}

	pub fn get_ref(&self) -> &W {
		&self.out
	}
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
	fn report(&mut self, report: &Report<'_>) {
		let written = writeln!(self.out, "{}", report).and_then(|_| self.out.flush());
		if let Err(e) = written {
			warn!(error = %e, "Failed to write report line");
		}
	}
}
