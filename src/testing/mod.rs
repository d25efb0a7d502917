//! Test support: fake devices, listers, and backends
//!
//! Public (not `#[cfg(test)]`) so downstream tools can exercise their
//! selection logic without hardware, the same way this crate's own tests do.

pub mod mock;

pub use mock::{CallCounter, FakeDevice, FakeDeviceDiscovery, FakeDeviceLister};
