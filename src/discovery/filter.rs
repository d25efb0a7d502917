//! Composable eligibility filters for discovered devices
//!
//! Two layers: [`DeviceDiscoverySupportFilter`] answers "may the tool deploy
//! to this device given the selection intent," and [`DeviceDiscoveryFilter`]
//! wraps it with connectivity and connection-interface requirements. Both
//! are immutable once constructed — build a fresh one per query.
//!
//! Filtering is stable: matching entries keep their input order.

use crate::device::traits::{Device, Project};
use crate::device::types::ConnectionInterface;
use std::sync::Arc;

// =============================================================================
// Support filter
// =============================================================================

/// Tool- and project-level eligibility rules for a device
///
/// Three independent exclusion rules; which combination applies depends on
/// the selection intent, so construction goes through the named variants
/// rather than raw flags (see `DeviceManager::build_selection_filter`).
#[derive(Debug, Clone, Default)]
pub struct DeviceDiscoverySupportFilter {
    /// Exclude devices the tool cannot deploy to at all
    exclude_unsupported_by_tool: bool,
    /// Exclude devices unsupported by the current project context
    exclude_unsupported_by_project: bool,
    /// Exclude devices ineligible under the "all devices" selection
    exclude_unsupported_by_all: bool,
    /// Project context for the project-level checks; when absent those
    /// checks are vacuously true
    project: Option<Project>,
}

impl DeviceDiscoverySupportFilter {
    /// Variant for an explicitly named device: only tool support matters,
    /// an explicit ID overrides project suitability checks
    pub fn exclude_unsupported_by_tool() -> Self {
        Self {
            exclude_unsupported_by_tool: true,
            ..Default::default()
        }
    }

    /// Variant for the default heuristic selection: tool and project support
    pub fn exclude_unsupported_by_tool_or_project(project: Option<Project>) -> Self {
        Self {
            exclude_unsupported_by_tool: true,
            exclude_unsupported_by_project: true,
            project,
            ..Default::default()
        }
    }

    /// Variant for the "all devices" selection: additionally excludes the
    /// platform families that cannot share the aggregate execution pipeline
    pub fn exclude_unsupported_by_all(project: Option<Project>) -> Self {
        Self {
            exclude_unsupported_by_all: true,
            project,
            ..Default::default()
        }
    }

    /// Whether the device passes every enabled rule
    pub async fn matches(&self, device: &Arc<dyn Device>) -> bool {
        if self.exclude_unsupported_by_tool && !device.is_supported() {
            return false;
        }

        if self.exclude_unsupported_by_project && !self.supported_for_project(device) {
            return false;
        }

        if self.exclude_unsupported_by_all {
            if !device.target_platform().await.supports_run_all() {
                return false;
            }
            if !device.is_supported() || !self.supported_for_project(device) {
                return false;
            }
        }

        true
    }

    /// Project support check, vacuously true without a project context
    fn supported_for_project(&self, device: &Arc<dyn Device>) -> bool {
        match &self.project {
            Some(project) => device.is_supported_for_project(project),
            None => true,
        }
    }
}

// =============================================================================
// Discovery filter
// =============================================================================

/// Eligibility rules applied by backends when listing devices
///
/// An immutable triple: connectivity requirement, optional support filter,
/// optional required connection interface.
#[derive(Debug, Clone)]
pub struct DeviceDiscoveryFilter {
    /// Drop devices that are not currently reachable
    pub exclude_disconnected: bool,
    /// Tool/project eligibility, if the query cares
    pub support_filter: Option<DeviceDiscoverySupportFilter>,
    /// Only accept devices reached over this interface, if set
    pub required_interface: Option<ConnectionInterface>,
}

impl Default for DeviceDiscoveryFilter {
    fn default() -> Self {
        Self {
            exclude_disconnected: true,
            support_filter: None,
            required_interface: None,
        }
    }
}

impl DeviceDiscoveryFilter {
    /// Filter that only requires connectivity
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep disconnected devices in results
    pub fn include_disconnected(mut self) -> Self {
        self.exclude_disconnected = false;
        self
    }

    /// Attach a support filter
    pub fn with_support_filter(mut self, filter: DeviceDiscoverySupportFilter) -> Self {
        self.support_filter = Some(filter);
        self
    }

    /// Require a specific connection interface
    pub fn with_interface(mut self, interface: ConnectionInterface) -> Self {
        self.required_interface = Some(interface);
        self
    }

    /// Whether the device passes connectivity, support, and interface rules
    pub async fn matches(&self, device: &Arc<dyn Device>) -> bool {
        if self.exclude_disconnected && !device.is_connected() {
            return false;
        }

        if let Some(support) = &self.support_filter {
            if !support.matches(device).await {
                return false;
            }
        }

        if let Some(required) = self.required_interface {
            if device.connection_interface() != required {
                return false;
            }
        }

        true
    }

    /// Keep only matching devices, preserving input order
    pub async fn filter_devices(&self, devices: Vec<Arc<dyn Device>>) -> Vec<Arc<dyn Device>> {
        let mut matched = Vec::with_capacity(devices.len());
        for device in devices {
            if self.matches(&device).await {
                matched.push(device);
            }
        }
        matched
    }
}
