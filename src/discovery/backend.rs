//! Discovery backend contract
//!
//! Every platform-specific enumeration source implements [`DeviceDiscovery`].
//! Most backends get it for free by wrapping their raw enumeration primitive
//! in [`PollingDeviceDiscovery`](crate::discovery::polling::PollingDeviceDiscovery);
//! implementing the trait directly is only needed when a backend manages its
//! own caching.

use crate::core::error::Result;
use crate::device::traits::Device;
use crate::discovery::filter::DeviceDiscoveryFilter;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Contract every device enumeration backend exposes to the manager
#[async_trait]
pub trait DeviceDiscovery: Send + Sync {
    /// Short backend name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Whether this backend can produce anything in the current host
    /// environment.
    ///
    /// A backend returning `false` is excluded from all aggregate
    /// operations — it is never queried, refreshed, or asked for
    /// diagnostics.
    fn supports_platform(&self) -> bool;

    /// Whether listing is currently possible (e.g. the external tool the
    /// backend shells out to is present and working)
    async fn can_list_anything(&self) -> bool;

    /// Current known devices, filtered, without forcing a fresh scan.
    ///
    /// Implementations must populate their cache on the first call; later
    /// calls read the cache until an explicit refresh replaces it.
    async fn devices(&self, filter: &DeviceDiscoveryFilter) -> Result<Vec<Arc<dyn Device>>>;

    /// Force a fresh scan bounded by `timeout`, replacing the cache, then
    /// filter
    async fn discover_devices(
        &self,
        timeout: Duration,
        filter: &DeviceDiscoveryFilter,
    ) -> Result<Vec<Arc<dyn Device>>>;

    /// Human-readable descriptions of current problems, empty if none
    async fn diagnostics(&self) -> Vec<String>;

    /// IDs this backend can resolve without any I/O.
    ///
    /// Used by the manager to short-circuit lookups: when a requested ID is
    /// well known to some backend, only the declaring backends are queried.
    fn well_known_ids(&self) -> Vec<String>;
}
