//! EVM readers.

pub mod alloy;

pub use self::alloy::AlloyReader;
