//! Mock devices and backends for testing without real hardware
//!
//! Mirrors the shapes of the real contracts: [`FakeDevice`] implements the
//! device capability contract, [`FakeDeviceLister`] stands in for a raw
//! enumeration primitive under the polling engine, and
//! [`FakeDeviceDiscovery`] is a complete self-caching backend for manager
//! tests. All behaviors (delays, failures, hangs) are configured through
//! builders.

use crate::core::error::{DiscoveryError, Result};
use crate::device::traits::{Device, Project};
use crate::device::types::{Category, ConnectionInterface, PlatformType};
use crate::discovery::backend::DeviceDiscovery;
use crate::discovery::filter::DeviceDiscoveryFilter;
use crate::discovery::polling::DeviceLister;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sleep standing in for "never resolves" in hang simulations
const HANG_FOREVER: Duration = Duration::from_secs(3600);

/// Shared call counter handed out by the fakes so tests can assert how
/// often an operation actually ran
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    /// Number of recorded calls
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Fake device
// =============================================================================

/// Configurable in-memory device
#[derive(Debug, Clone)]
pub struct FakeDevice {
    id: String,
    name: String,
    category: Option<Category>,
    platform_type: PlatformType,
    ephemeral: bool,
    connected: bool,
    interface: ConnectionInterface,
    supported: bool,
    supported_for_project: bool,
    emulator: bool,
    sdk: String,
}

impl FakeDevice {
    /// A connected, supported, non-ephemeral Android device
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: Some(Category::Mobile),
            platform_type: PlatformType::Android,
            ephemeral: false,
            connected: true,
            interface: ConnectionInterface::Attached,
            supported: true,
            supported_for_project: true,
            emulator: false,
            sdk: "fake-sdk 1.0".to_string(),
        }
    }

    /// Set the workflow category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the target platform
    pub fn with_platform_type(mut self, platform: PlatformType) -> Self {
        self.platform_type = platform;
        self
    }

    /// Set the connection interface
    pub fn with_interface(mut self, interface: ConnectionInterface) -> Self {
        self.interface = interface;
        self
    }

    /// Set the SDK version string
    pub fn with_sdk(mut self, sdk: &str) -> Self {
        self.sdk = sdk.to_string();
        self
    }

    /// Mark as a transient primary-candidate target
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Mark as currently unreachable
    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Mark as unsupported by the tool
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Mark as unsupported for any project context
    pub fn unsupported_for_project(mut self) -> Self {
        self.supported_for_project = false;
        self
    }

    /// Mark as an emulated device
    pub fn emulator(mut self) -> Self {
        self.emulator = true;
        self
    }
}

#[async_trait]
impl Device for FakeDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<Category> {
        self.category
    }

    fn platform_type(&self) -> Option<PlatformType> {
        Some(self.platform_type)
    }

    fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connection_interface(&self) -> ConnectionInterface {
        self.interface
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_supported_for_project(&self, _project: &Project) -> bool {
        self.supported_for_project
    }

    async fn target_platform(&self) -> PlatformType {
        self.platform_type
    }

    async fn sdk_name_and_version(&self) -> Result<String> {
        Ok(self.sdk.clone())
    }

    async fn is_emulator(&self) -> bool {
        self.emulator
    }
}

// =============================================================================
// Fake lister (raw enumeration primitive)
// =============================================================================

/// Scriptable raw enumerator for polling-engine tests
///
/// Each `poll_devices` call consumes the next queued result; once the queue
/// is exhausted the last successful list is returned again (so a background
/// timer can keep ticking against a stable world).
pub struct FakeDeviceLister {
    name: String,
    delay: Option<Duration>,
    results: Mutex<VecDeque<Result<Vec<Arc<dyn Device>>>>>,
    sticky: Mutex<Vec<Arc<dyn Device>>>,
    calls: CallCounter,
}

impl FakeDeviceLister {
    /// An empty lister that reports no devices
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delay: None,
            results: Mutex::new(VecDeque::new()),
            sticky: Mutex::new(Vec::new()),
            calls: CallCounter::default(),
        }
    }

    /// Delay every enumeration by this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Lister that returns the same list on every call
    pub fn repeating(self, devices: Vec<Arc<dyn Device>>) -> Self {
        *self.sticky.lock().unwrap() = devices;
        self
    }

    /// Queue the result of the next enumeration
    pub fn push_result(&self, result: Result<Vec<Arc<dyn Device>>>) {
        self.results.lock().unwrap().push_back(result);
    }

    /// Counter of `poll_devices` invocations
    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl DeviceLister for FakeDeviceLister {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll_devices(&self, _timeout: Option<Duration>) -> Result<Vec<Arc<dyn Device>>> {
        self.calls.increment();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.results.lock().unwrap().pop_front();
        match queued {
            Some(Ok(devices)) => {
                *self.sticky.lock().unwrap() = devices.clone();
                Ok(devices)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.sticky.lock().unwrap().clone()),
        }
    }
}

// =============================================================================
// Fake backend (full discovery contract)
// =============================================================================

/// Configurable self-caching backend for manager tests
pub struct FakeDeviceDiscovery {
    name: String,
    devices: Vec<Arc<dyn Device>>,
    delay: Option<Duration>,
    hang: bool,
    fail: bool,
    supports_platform: bool,
    can_list: bool,
    diagnostics: Vec<String>,
    well_known_ids: Vec<String>,
    devices_calls: CallCounter,
    discover_calls: CallCounter,
}

impl FakeDeviceDiscovery {
    /// A healthy backend with no devices
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            devices: Vec::new(),
            delay: None,
            hang: false,
            fail: false,
            supports_platform: true,
            can_list: true,
            diagnostics: Vec::new(),
            well_known_ids: Vec::new(),
            devices_calls: CallCounter::default(),
            discover_calls: CallCounter::default(),
        }
    }

    /// Set the devices every query returns
    pub fn with_devices(mut self, devices: Vec<Arc<dyn Device>>) -> Self {
        self.devices = devices;
        self
    }

    /// Delay every query by this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Never resolve queries (simulated hang)
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Fail every query with a backend error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Report that this backend cannot run on the host at all
    pub fn platform_unsupported(mut self) -> Self {
        self.supports_platform = false;
        self
    }

    /// Report that listing is currently impossible
    pub fn cannot_list(mut self) -> Self {
        self.can_list = false;
        self
    }

    /// Set the diagnostic messages this backend reports
    pub fn with_diagnostics(mut self, messages: Vec<&str>) -> Self {
        self.diagnostics = messages.into_iter().map(String::from).collect();
        self
    }

    /// Declare IDs resolvable without I/O
    pub fn with_well_known_ids(mut self, ids: Vec<&str>) -> Self {
        self.well_known_ids = ids.into_iter().map(String::from).collect();
        self
    }

    /// Counter of `devices` invocations
    pub fn devices_call_counter(&self) -> CallCounter {
        self.devices_calls.clone()
    }

    /// Counter of `discover_devices` invocations
    pub fn discover_call_counter(&self) -> CallCounter {
        self.discover_calls.clone()
    }

    async fn query(&self, filter: &DeviceDiscoveryFilter) -> Result<Vec<Arc<dyn Device>>> {
        if self.hang {
            tokio::time::sleep(HANG_FOREVER).await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(DiscoveryError::Backend {
                backend: self.name.clone(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(filter.filter_devices(self.devices.clone()).await)
    }
}

#[async_trait]
impl DeviceDiscovery for FakeDeviceDiscovery {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_platform(&self) -> bool {
        self.supports_platform
    }

    async fn can_list_anything(&self) -> bool {
        self.can_list
    }

    async fn devices(&self, filter: &DeviceDiscoveryFilter) -> Result<Vec<Arc<dyn Device>>> {
        self.devices_calls.increment();
        self.query(filter).await
    }

    async fn discover_devices(
        &self,
        _timeout: Duration,
        filter: &DeviceDiscoveryFilter,
    ) -> Result<Vec<Arc<dyn Device>>> {
        self.discover_calls.increment();
        self.query(filter).await
    }

    async fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.clone()
    }

    fn well_known_ids(&self) -> Vec<String> {
        self.well_known_ids.clone()
    }
}
