//! Device discovery: backend contract, filters, and the polling engine
//!
//! # Submodules
//!
//! - `backend` - The [`DeviceDiscovery`] contract every enumeration source
//!   implements
//! - `filter` - Composable eligibility filters applied to listed devices
//! - `polling` - Caching/polling engine layering timers and change
//!   notification over a raw enumeration primitive

pub mod backend;
pub mod filter;
pub mod polling;

pub use backend::DeviceDiscovery;
pub use filter::{DeviceDiscoveryFilter, DeviceDiscoverySupportFilter};
pub use polling::{DeviceLister, PollingConfig, PollingDeviceDiscovery};
