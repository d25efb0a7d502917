//! Device capability contract
//!
//! This module defines the trait every deployable target must satisfy. The
//! discovery core only ever *reads* these capabilities — concrete device
//! instances are produced by enumeration backends, never constructed here.
//!
//! Identity is defined solely by [`Device::id`]: two devices with the same
//! ID are the same target even if the display name or connection state has
//! changed between scans. The polling engine's diffing relies on this.

use crate::core::error::Result;
use crate::device::types::{
    Category, ConnectionInterface, DeviceCapabilities, DeviceSummary, PlatformType,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Project context used for project-level support checks
///
/// The discovery core treats this as opaque: it is handed to
/// [`Device::is_supported_for_project`] untouched. Callers construct it from
/// the directory the deployment was invoked in.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Root directory of the project being deployed
    pub root: PathBuf,
}

impl Project {
    /// Create a project context rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Reader for a running application's log stream on a device
///
/// Opaque to the discovery core; handed through to the tooling layers that
/// attach to a deployed application.
pub trait DeviceLogReader: Send + Sync {
    /// Display name of the log source
    fn name(&self) -> &str;
}

/// Network port forwarder between host and device
///
/// Opaque to the discovery core, passed through untouched.
pub trait DevicePortForwarder: Send + Sync {
    /// Forwarded (host, device) port pairs currently active
    fn forwarded_ports(&self) -> Vec<(u16, u16)>;
}

/// Capability contract a deployable target must satisfy
///
/// Backends return devices as `Arc<dyn Device>`; the discovery core shares
/// them freely by reference and never mutates them. Only the few genuinely
/// platform-specific operations are required — everything with a sensible
/// ambient default has one.
#[async_trait]
pub trait Device: Send + Sync {
    /// Stable, unique device identifier
    fn id(&self) -> &str;

    /// User-facing display name (may change without affecting identity)
    fn name(&self) -> &str;

    /// Coarse workflow category, if the device declares one
    fn category(&self) -> Option<Category> {
        None
    }

    /// Platform sub-family, if known without querying the device
    fn platform_type(&self) -> Option<PlatformType> {
        None
    }

    /// Whether this device is a transient, primary-candidate target
    /// (phones, emulators) as opposed to a persistent desktop-type target
    fn is_ephemeral(&self) -> bool;

    /// Whether the device is currently reachable
    fn is_connected(&self) -> bool {
        true
    }

    /// How the device is reached from the host
    fn connection_interface(&self) -> ConnectionInterface {
        ConnectionInterface::default()
    }

    /// Whether the tool can deploy to this device at all
    fn is_supported(&self) -> bool;

    /// Whether this device is a viable target for the given project
    fn is_supported_for_project(&self, project: &Project) -> bool;

    /// Resolve the device's target platform.
    ///
    /// Async because some backends must query the device to know it.
    async fn target_platform(&self) -> PlatformType;

    /// SDK or OS version string, e.g. "Android 14 (API 34)"
    async fn sdk_name_and_version(&self) -> Result<String>;

    /// Whether this is an emulated/simulated device
    async fn is_emulator(&self) -> bool {
        false
    }

    /// Runtime capabilities advertised to the deployment pipeline
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::default()
    }

    /// Log reader for a deployed application, when the platform offers one.
    /// Passed through to tooling layers untouched.
    fn log_reader(&self) -> Option<Arc<dyn DeviceLogReader>> {
        None
    }

    /// Port forwarder to the device, when the platform offers one.
    /// Passed through to tooling layers untouched.
    fn port_forwarder(&self) -> Option<Arc<dyn DevicePortForwarder>> {
        None
    }
}

/// Build the machine-readable summary record for a device
///
/// Lives here rather than on the trait so backend implementers never have
/// to think about the serialized field contract.
pub async fn device_summary(device: &Arc<dyn Device>) -> DeviceSummary {
    let sdk = device
        .sdk_name_and_version()
        .await
        .unwrap_or_else(|_| "unknown".to_string());

    DeviceSummary {
        name: device.name().to_string(),
        id: device.id().to_string(),
        is_supported: device.is_supported(),
        target_platform: device.target_platform().await.display_name().to_string(),
        emulator: device.is_emulator().await,
        sdk,
        capabilities: device.capabilities(),
    }
}

/// Case-insensitive equality of a query string to a device's ID or name
pub fn is_exact_match(device: &Arc<dyn Device>, query: &str) -> bool {
    let query = query.to_lowercase();
    device.id().to_lowercase() == query || device.name().to_lowercase() == query
}

/// Case-insensitive prefix relation of a query string to a device's ID or name
pub fn is_prefix_match(device: &Arc<dyn Device>, query: &str) -> bool {
    let query = query.to_lowercase();
    device.id().to_lowercase().starts_with(&query)
        || device.name().to_lowercase().starts_with(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let device: Arc<dyn Device> = Arc::new(FakeDevice::new("emulator-5554", "Pixel 8"));

        assert!(is_exact_match(&device, "EMULATOR-5554"));
        assert!(is_exact_match(&device, "pixel 8"));
        assert!(!is_exact_match(&device, "pixel"));
    }

    #[test]
    fn test_prefix_match_on_id_and_name() {
        let device: Arc<dyn Device> = Arc::new(FakeDevice::new("emulator-5554", "Pixel 8"));

        assert!(is_prefix_match(&device, "emu"));
        assert!(is_prefix_match(&device, "PIX"));
        assert!(!is_prefix_match(&device, "5554"));
    }

    #[tokio::test]
    async fn test_device_summary_fields() {
        let device: Arc<dyn Device> = Arc::new(
            FakeDevice::new("web-server", "Web Server")
                .with_platform_type(crate::device::types::PlatformType::Web)
                .with_sdk("Chromium 126"),
        );

        let summary = device_summary(&device).await;
        assert_eq!(summary.id, "web-server");
        assert_eq!(summary.name, "Web Server");
        assert_eq!(summary.target_platform, "web-javascript");
        assert_eq!(summary.sdk, "Chromium 126");
        assert!(summary.is_supported);
    }
}
