//! Device contract module
//!
//! Defines what the discovery core requires from a deployable target: the
//! [`Device`] capability trait plus the value types read by filters and
//! serialized summaries. Concrete devices are produced by backends; the
//! core never constructs or owns them.

pub mod traits;
pub mod types;

pub use traits::{
    device_summary, is_exact_match, is_prefix_match, Device, DeviceLogReader,
    DevicePortForwarder, Project,
};
pub use types::{
    Category, ConnectionInterface, DeviceCapabilities, DeviceSummary, PlatformType,
};
