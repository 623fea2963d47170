//! Oracle implementation modules, one per contract family.

pub mod chainlink;
pub mod uniswap_v2;
