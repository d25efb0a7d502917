//! Concrete enumeration backends
//!
//! Currently only the host desktop backend ships in-tree; platform
//! backends for phones and browsers plug in through the same
//! [`DeviceLister`](crate::discovery::polling::DeviceLister) seam.

pub mod host;

pub use host::{HostDevice, HostDeviceLister};
