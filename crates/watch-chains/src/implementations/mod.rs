//! Concrete `ContractReader` implementations.

pub mod evm;
