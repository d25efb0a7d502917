//! Value types shared by devices, filters, and the discovery layer
//!
//! These are the coarse classification enums read by the selection
//! algorithm, plus the serialized summary record consumed by tooling
//! layers (`--machine` output and IDE integrations).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Coarse workflow classification of a device
///
/// A device may not declare a category at all; selection logic treats the
/// category as advisory display metadata, never as an eligibility input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Browser-hosted targets
    Web,
    /// Desktop machines (linux, macos, windows)
    Desktop,
    /// Phones and tablets
    Mobile,
}

impl Category {
    /// Get a human-readable name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Web => "web",
            Category::Desktop => "desktop",
            Category::Mobile => "mobile",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Platform sub-family of a device
///
/// `Fuchsia` and `Web` cannot share an execution pipeline with the other
/// families, which is why the "all devices" selection excludes them (see
/// `DeviceDiscoverySupportFilter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformType {
    Web,
    Android,
    Ios,
    Linux,
    Macos,
    Windows,
    Fuchsia,
    Custom,
}

impl PlatformType {
    /// Get a human-readable name for this platform
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformType::Web => "web-javascript",
            PlatformType::Android => "android",
            PlatformType::Ios => "ios",
            PlatformType::Linux => "linux",
            PlatformType::Macos => "darwin",
            PlatformType::Windows => "windows",
            PlatformType::Fuchsia => "fuchsia",
            PlatformType::Custom => "custom",
        }
    }

    /// Whether this platform can participate in the "all devices" pipeline
    pub fn supports_run_all(&self) -> bool {
        !matches!(self, PlatformType::Fuchsia | PlatformType::Web)
    }
}

impl Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How a device is reached from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionInterface {
    /// Physically attached (USB) or local to the host
    #[default]
    Attached,
    /// Reached over the network
    Wireless,
}

impl ConnectionInterface {
    /// Get a human-readable name for this interface
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionInterface::Attached => "attached",
            ConnectionInterface::Wireless => "wireless",
        }
    }
}

impl Display for ConnectionInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Runtime capabilities a device advertises to the deployment pipeline
///
/// Passed through untouched by the discovery core; consumed by tooling
/// layers deciding which workflows (reload, screenshot, ...) to offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    /// Supports in-place code reload
    pub hot_reload: bool,
    /// Supports full state-preserving restart
    pub hot_restart: bool,
    /// Supports capturing screenshots
    pub screenshot: bool,
    /// Supports fast-start deployment (skip full sync)
    pub fast_start: bool,
    /// Supports clean application exit on request
    pub clean_exit: bool,
    /// Renders with hardware acceleration
    pub hardware_rendering: bool,
    /// Supports launching with the runtime paused
    pub start_paused: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            hot_reload: true,
            hot_restart: true,
            screenshot: false,
            fast_start: false,
            clean_exit: true,
            hardware_rendering: true,
            start_paused: true,
        }
    }
}

/// Machine-readable summary of a device for listing output
///
/// Field presence and naming are part of the external contract consumed by
/// tooling outside this crate; do not rename fields casually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    /// User-facing display name
    pub name: String,
    /// Stable device identifier
    pub id: String,
    /// Whether the tool supports this device at all
    pub is_supported: bool,
    /// Display name of the target platform
    pub target_platform: String,
    /// Whether this is an emulated/simulated device
    pub emulator: bool,
    /// SDK or OS version string reported by the device
    pub sdk: String,
    /// Runtime capability flags
    pub capabilities: DeviceCapabilities,
}
