//! Core functionality: configuration and error handling

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{DiscoveryError, Result};
