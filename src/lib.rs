//! Device Roster Library
//!
//! The device discovery and selection layer of a deployment tool: it
//! aggregates independent, variable-latency, fallible enumeration backends
//! into one consistent answer to "which device(s) satisfy the caller's
//! selection intent."
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`core`] - Configuration and error handling
//! - [`device`] - The device capability contract and shared value types
//! - [`discovery`] - The backend contract, filter composition, and the
//!   caching/polling engine with added/removed change notification
//! - [`manager`] - The top-level façade composing N backends and resolving
//!   the race between them
//! - [`backend`] - Concrete in-tree backends (host desktop)
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testing`] - Fake devices and backends for testing without hardware
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use device_roster::backend::HostDeviceLister;
//! use device_roster::discovery::{
//!     DeviceDiscovery, DeviceDiscoveryFilter, PollingDeviceDiscovery,
//! };
//! use device_roster::manager::DeviceManager;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let host = Arc::new(PollingDeviceDiscovery::new(HostDeviceLister));
//!     let manager = DeviceManager::new(vec![host as Arc<dyn DeviceDiscovery>]);
//!
//!     // Selection intent comes from the user, set exactly once per run.
//!     manager.set_specified_device_id(Some("linux".to_string()));
//!
//!     let filter = DeviceDiscoveryFilter::new()
//!         .with_support_filter(manager.build_selection_filter(None, false));
//!     for device in manager.get_devices(&filter).await {
//!         println!("{} ({})", device.name(), device.id());
//!     }
//! }
//! ```
//!
//! # Concurrency model
//!
//! Single-threaded cooperative concurrency: backend queries run as
//! independently scheduled tasks multiplexed on one execution context.
//! Within aggregate queries, per-backend device order is preserved and
//! backends are concatenated in registration order irrespective of
//! completion order. ID lookups race: the first exact match wins, losing
//! branches run to completion detached and their results are discarded.
//!
//! # Testing Without Devices
//!
//! The [`testing`] module provides configurable fakes:
//!
//! ```rust
//! use device_roster::testing::{FakeDevice, FakeDeviceDiscovery};
//! use device_roster::Device;
//! use std::sync::Arc;
//!
//! let pixel: Arc<dyn Device> = Arc::new(FakeDevice::new("pixel", "Pixel 8"));
//! let backend = FakeDeviceDiscovery::new("fake").with_devices(vec![pixel]);
//! ```

pub mod backend;
pub mod cli;
pub mod core;
pub mod device;
pub mod discovery;
pub mod manager;
pub mod testing;

pub use device::{Device, DeviceSummary, Project};
pub use discovery::{DeviceDiscovery, DeviceDiscoveryFilter, PollingDeviceDiscovery};
pub use manager::DeviceManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
