//! Building blocks for Android Nearby style device discovery and pairing:
//! a codec for FiRa BLE discovery advertisements ([uwb]) and the handler that
//! turns a Fast Pair attempt into UI and telemetry side effects ([fastpair]).

pub mod config;

pub mod errors;
pub use errors::{Error, Result};

pub mod fastpair;

pub mod utils;

pub mod uwb;
pub use uwb::DiscoveryAdvertisement;

pub mod version;
pub use version::{Version, VERSION};

#[cfg(test)]
pub mod testing;
