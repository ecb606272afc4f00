//! keychain-core - Shared functionality for keychain-cli
//!
//! Standard paths, the configuration file and output formatting.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
