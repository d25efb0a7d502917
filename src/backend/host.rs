//! Host desktop backend
//!
//! Enumerates the machine the tool is running on as a single, always
//! attached desktop device. This is the cheapest possible backend — there
//! is no external tool to shell out to — so enumeration never times out
//! and the device ID is well known.

use crate::core::error::Result;
use crate::device::traits::{Device, Project};
use crate::device::types::{Category, ConnectionInterface, DeviceCapabilities, PlatformType};
use crate::discovery::polling::DeviceLister;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[cfg(target_os = "linux")]
const HOST_PLATFORM: PlatformType = PlatformType::Linux;
#[cfg(target_os = "macos")]
const HOST_PLATFORM: PlatformType = PlatformType::Macos;
#[cfg(target_os = "windows")]
const HOST_PLATFORM: PlatformType = PlatformType::Windows;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const HOST_PLATFORM: PlatformType = PlatformType::Custom;

#[cfg(target_os = "linux")]
const HOST_DEVICE_ID: &str = "linux";
#[cfg(target_os = "macos")]
const HOST_DEVICE_ID: &str = "macos";
#[cfg(target_os = "windows")]
const HOST_DEVICE_ID: &str = "windows";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const HOST_DEVICE_ID: &str = "host";

/// The local machine as a deployable desktop target
#[derive(Debug, Clone)]
pub struct HostDevice {
    name: String,
}

impl HostDevice {
    /// Create the host device, named after the machine's hostname when the
    /// environment exposes one
    pub fn new() -> Self {
        let name = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| format!("{} desktop", std::env::consts::OS));
        Self { name }
    }
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for HostDevice {
    fn id(&self) -> &str {
        HOST_DEVICE_ID
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<Category> {
        Some(Category::Desktop)
    }

    fn platform_type(&self) -> Option<PlatformType> {
        Some(HOST_PLATFORM)
    }

    // Desktop targets are persistent, never the ambient default.
    fn is_ephemeral(&self) -> bool {
        false
    }

    fn connection_interface(&self) -> ConnectionInterface {
        ConnectionInterface::Attached
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn is_supported_for_project(&self, _project: &Project) -> bool {
        true
    }

    async fn target_platform(&self) -> PlatformType {
        HOST_PLATFORM
    }

    async fn sdk_name_and_version(&self) -> Result<String> {
        Ok(format!(
            "{} {}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            screenshot: false,
            fast_start: true,
            ..DeviceCapabilities::default()
        }
    }
}

/// Raw enumerator producing the single host device
pub struct HostDeviceLister;

#[async_trait]
impl DeviceLister for HostDeviceLister {
    fn name(&self) -> &str {
        "host"
    }

    fn supports_platform(&self) -> bool {
        cfg!(any(
            target_os = "linux",
            target_os = "macos",
            target_os = "windows"
        ))
    }

    async fn poll_devices(&self, _timeout: Option<Duration>) -> Result<Vec<Arc<dyn Device>>> {
        Ok(vec![Arc::new(HostDevice::new())])
    }

    fn well_known_ids(&self) -> Vec<String> {
        vec![HOST_DEVICE_ID.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::backend::DeviceDiscovery;
    use crate::discovery::filter::DeviceDiscoveryFilter;
    use crate::discovery::polling::PollingDeviceDiscovery;

    #[tokio::test]
    async fn test_host_backend_lists_one_device() {
        let discovery = PollingDeviceDiscovery::new(HostDeviceLister);
        let devices = discovery
            .devices(&DeviceDiscoveryFilter::new())
            .await
            .unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), HOST_DEVICE_ID);
        assert!(devices[0].is_connected());
        assert!(!devices[0].is_ephemeral());
    }

    #[test]
    fn test_host_id_is_well_known() {
        assert_eq!(
            HostDeviceLister.well_known_ids(),
            vec![HOST_DEVICE_ID.to_string()]
        );
    }
}
