//! Deviation monitoring for the oracle watch.
//!
//! The poll loop walks the configured symbols in order, fetches an oracle
//! price and a pool price for each, evaluates their relative deviation and
//! hands every result to a `Reporter`. Between cycles it waits on a
//! `Scheduler`. Failures stay scoped to the symbol that produced them.
//!
//! - `deviation`: relative deviation and threshold classification
//! - `poller`: the per-cycle driver and the `SymbolOutcome` it produces
//! - `report`: report lines and the console reporter
//! - `scheduler`: the wait between cycles

pub mod deviation;
pub mod poller;
pub mod report;
pub mod scheduler;

pub use deviation::{evaluate, DeviationError};
pub use poller::{PollLoop, SymbolError, SymbolOutcome};
pub use report::{ConsoleReporter, Report, Reporter};
pub use scheduler::{Scheduler, TokioScheduler};
