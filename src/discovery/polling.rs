//! Polling discovery engine
//!
//! A reusable [`DeviceDiscovery`] implementation that layers caching,
//! periodic background refresh, and added/removed change notification on
//! top of a raw, possibly-slow enumeration primitive ([`DeviceLister`]).
//!
//! # Lifecycle
//!
//! - **idle**: no cache, no timer. Construction does no I/O.
//! - **started**: `start_polling` arms the timer; the first tick fires after
//!   a short interval so a freshly started tool sees devices quickly.
//! - **steady**: subsequent ticks use a longer interval to keep overhead low
//!   once presence is established.
//!
//! The cache is populated on the first `devices()` call or the first
//! successful tick/refresh, whichever comes first, and is only ever
//! replaced wholesale — a timed-out scan leaves it untouched. Polling
//! refresh is advisory; only `discover_devices` is authoritative.

use crate::core::error::Result;
use crate::device::traits::Device;
use crate::discovery::backend::DeviceDiscovery;
use crate::discovery::filter::DeviceDiscoveryFilter;
use async_trait::async_trait;
use log::{debug, trace};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Default delay before the first poll tick
const INITIAL_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Default delay between steady-state poll ticks
const STEADY_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default time budget for a single background enumeration
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the added/removed broadcast channels; lagging subscribers
/// lose the oldest events
const EVENT_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// Raw enumeration primitive
// =============================================================================

/// The raw "enumerate now" primitive a platform-specific backend supplies
///
/// Implementers only provide the genuinely platform-specific operations;
/// caching, timers, and diffing come from [`PollingDeviceDiscovery`].
/// When a `timeout` is given the lister is expected to bound its own
/// enumeration by it and return [`DiscoveryError::Timeout`] on expiry.
///
/// [`DiscoveryError::Timeout`]: crate::core::error::DiscoveryError::Timeout
#[async_trait]
pub trait DeviceLister: Send + Sync + 'static {
    /// Short backend name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Whether this backend can produce anything on the current host
    fn supports_platform(&self) -> bool {
        true
    }

    /// Whether listing is currently possible
    async fn can_list_anything(&self) -> bool {
        true
    }

    /// Enumerate devices now, bounded by `timeout` if one is given
    async fn poll_devices(&self, timeout: Option<Duration>) -> Result<Vec<Arc<dyn Device>>>;

    /// Human-readable problem descriptions, empty if none
    async fn diagnostics(&self) -> Vec<String> {
        Vec::new()
    }

    /// IDs resolvable without any I/O
    fn well_known_ids(&self) -> Vec<String> {
        Vec::new()
    }
}

// =============================================================================
// Polling configuration
// =============================================================================

/// Timing knobs for the polling engine
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Delay before the first tick after `start_polling`
    pub initial_interval: Duration,
    /// Delay between steady-state ticks
    pub steady_interval: Duration,
    /// Time budget for each background enumeration
    pub poll_timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval: INITIAL_POLL_INTERVAL,
            steady_interval: STEADY_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollingConfig {
    /// Config with much shorter intervals, for responsive UIs and tests
    pub fn fast() -> Self {
        Self {
            initial_interval: Duration::from_millis(50),
            steady_interval: Duration::from_millis(100),
            poll_timeout: Duration::from_secs(1),
        }
    }

    /// Set the delay before the first tick
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Set the delay between steady-state ticks
    pub fn with_steady_interval(mut self, interval: Duration) -> Self {
        self.steady_interval = interval;
        self
    }

    /// Set the per-tick enumeration budget
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

// =============================================================================
// Polling engine
// =============================================================================

/// Cached device list plus the "has ever been populated" flag
struct DeviceCache {
    items: Vec<Arc<dyn Device>>,
    populated: bool,
}

/// Generic caching/polling backend built on a [`DeviceLister`]
///
/// Owns its cache and timer exclusively; nothing outside this struct
/// mutates cache membership. Disposal (`stop_polling` or drop) cancels the
/// timer, after which no further ticks occur.
pub struct PollingDeviceDiscovery<L: DeviceLister> {
    lister: Arc<L>,
    config: PollingConfig,
    cache: Arc<Mutex<DeviceCache>>,
    added_tx: broadcast::Sender<Arc<dyn Device>>,
    removed_tx: broadcast::Sender<Arc<dyn Device>>,
    poll_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<L: DeviceLister> PollingDeviceDiscovery<L> {
    /// Create an idle engine over the given lister. No I/O happens here.
    pub fn new(lister: L) -> Self {
        Self::with_config(lister, PollingConfig::default())
    }

    /// Create an idle engine with custom timing
    pub fn with_config(lister: L, config: PollingConfig) -> Self {
        let (added_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (removed_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            lister: Arc::new(lister),
            config,
            cache: Arc::new(Mutex::new(DeviceCache {
                items: Vec::new(),
                populated: false,
            })),
            added_tx,
            removed_tx,
            poll_task: std::sync::Mutex::new(None),
        }
    }

    /// Subscribe to per-device "added" notifications
    pub fn on_added(&self) -> broadcast::Receiver<Arc<dyn Device>> {
        self.added_tx.subscribe()
    }

    /// Subscribe to per-device "removed" notifications
    pub fn on_removed(&self) -> broadcast::Receiver<Arc<dyn Device>> {
        self.removed_tx.subscribe()
    }

    /// Arm the background timer. Idempotent while running.
    pub fn start_polling(&self) {
        let mut task = self.poll_task.lock().unwrap();
        if task.is_some() {
            return;
        }

        let lister = Arc::clone(&self.lister);
        let cache = Arc::clone(&self.cache);
        let added_tx = self.added_tx.clone();
        let removed_tx = self.removed_tx.clone();
        let config = self.config.clone();

        debug!("starting device polling for '{}'", lister.name());
        *task = Some(tokio::spawn(async move {
            // First tick after a short interval, then settle down.
            tokio::time::sleep(config.initial_interval).await;
            loop {
                Self::tick(&lister, &cache, &added_tx, &removed_tx, config.poll_timeout).await;
                tokio::time::sleep(config.steady_interval).await;
            }
        }));
    }

    /// Cancel the background timer. No further ticks occur after this.
    pub fn stop_polling(&self) {
        if let Some(task) = self.poll_task.lock().unwrap().take() {
            debug!("stopping device polling for '{}'", self.lister.name());
            task.abort();
        }
    }

    /// Whether the background timer is currently armed
    pub fn is_polling(&self) -> bool {
        self.poll_task.lock().unwrap().is_some()
    }

    /// One background refresh: bounded enumeration, then cache replacement.
    /// A timeout is not an error — the tick is skipped and the cache left
    /// untouched.
    async fn tick(
        lister: &Arc<L>,
        cache: &Arc<Mutex<DeviceCache>>,
        added_tx: &broadcast::Sender<Arc<dyn Device>>,
        removed_tx: &broadcast::Sender<Arc<dyn Device>>,
        timeout: Duration,
    ) {
        match lister.poll_devices(Some(timeout)).await {
            Ok(next) => {
                let mut cache = cache.lock().await;
                Self::replace_cache(&mut cache, next, added_tx, removed_tx);
            }
            Err(e) if e.is_timeout() => {
                trace!("'{}' poll tick timed out, skipping", lister.name());
            }
            Err(e) => {
                trace!("'{}' poll tick failed: {}", lister.name(), e);
            }
        }
    }

    /// Replace the cache with a fresh list and fire added/removed events
    /// for the delta.
    ///
    /// Diffing is by identity (ID) only — attribute changes never produce
    /// events. The very first population fires nothing: there is no
    /// previous list to diff against.
    fn replace_cache(
        cache: &mut DeviceCache,
        next: Vec<Arc<dyn Device>>,
        added_tx: &broadcast::Sender<Arc<dyn Device>>,
        removed_tx: &broadcast::Sender<Arc<dyn Device>>,
    ) {
        if cache.populated {
            let old_ids: HashSet<String> =
                cache.items.iter().map(|d| d.id().to_string()).collect();
            let new_ids: HashSet<String> = next.iter().map(|d| d.id().to_string()).collect();

            for device in &next {
                if !old_ids.contains(device.id()) {
                    debug!("device added: {} ({})", device.name(), device.id());
                    let _ = added_tx.send(Arc::clone(device));
                }
            }
            for device in &cache.items {
                if !new_ids.contains(device.id()) {
                    debug!("device removed: {} ({})", device.name(), device.id());
                    let _ = removed_tx.send(Arc::clone(device));
                }
            }
        }

        cache.items = next;
        cache.populated = true;
    }
}

#[async_trait]
impl<L: DeviceLister> DeviceDiscovery for PollingDeviceDiscovery<L> {
    fn name(&self) -> &str {
        self.lister.name()
    }

    fn supports_platform(&self) -> bool {
        self.lister.supports_platform()
    }

    async fn can_list_anything(&self) -> bool {
        self.lister.can_list_anything().await
    }

    /// Cached read. Populates the cache exactly once if it has never been
    /// populated: the cache lock is held across the enumeration, so
    /// concurrent first readers wait for it and observe its result rather
    /// than enumerating again.
    async fn devices(&self, filter: &DeviceDiscoveryFilter) -> Result<Vec<Arc<dyn Device>>> {
        let mut cache = self.cache.lock().await;
        if !cache.populated {
            trace!("'{}' cache empty, enumerating", self.lister.name());
            cache.items = self.lister.poll_devices(None).await?;
            cache.populated = true;
        }
        Ok(filter.filter_devices(cache.items.clone()).await)
    }

    /// Authoritative refresh: unconditionally re-enumerate (bounded by
    /// `timeout`), replace the cache, then filter. On timeout the cache is
    /// left unchanged and the stale view is returned.
    async fn discover_devices(
        &self,
        timeout: Duration,
        filter: &DeviceDiscoveryFilter,
    ) -> Result<Vec<Arc<dyn Device>>> {
        let mut cache = self.cache.lock().await;
        match self.lister.poll_devices(Some(timeout)).await {
            Ok(next) => {
                Self::replace_cache(&mut cache, next, &self.added_tx, &self.removed_tx);
            }
            Err(e) if e.is_timeout() => {
                trace!("'{}' refresh timed out, keeping cache", self.lister.name());
            }
            Err(e) => return Err(e),
        }
        Ok(filter.filter_devices(cache.items.clone()).await)
    }

    async fn diagnostics(&self) -> Vec<String> {
        self.lister.diagnostics().await
    }

    fn well_known_ids(&self) -> Vec<String> {
        self.lister.well_known_ids()
    }
}

impl<L: DeviceLister> Drop for PollingDeviceDiscovery<L> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DiscoveryError;
    use crate::testing::{FakeDevice, FakeDeviceLister};

    fn dev(id: &str) -> Arc<dyn Device> {
        Arc::new(FakeDevice::new(id, id))
    }

    #[tokio::test]
    async fn test_first_devices_call_populates_cache() {
        let lister = FakeDeviceLister::new("fake");
        lister.push_result(Ok(vec![dev("a"), dev("b")]));
        let counter = lister.call_counter();
        let discovery = PollingDeviceDiscovery::new(lister);

        let filter = DeviceDiscoveryFilter::new();
        let devices = discovery.devices(&filter).await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(counter.get(), 1);

        // Second read comes from cache, no new enumeration.
        let devices = discovery.devices(&filter).await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(counter.get(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_reads_enumerate_once() {
        let lister = FakeDeviceLister::new("fake")
            .with_delay(Duration::from_millis(20));
        lister.push_result(Ok(vec![dev("a")]));
        let counter = lister.call_counter();
        let discovery = Arc::new(PollingDeviceDiscovery::new(lister));

        let filter = DeviceDiscoveryFilter::new();
        let (first, second) = tokio::join!(
            discovery.devices(&filter),
            discovery.devices(&filter),
        );

        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(second.unwrap().len(), 1);
        assert_eq!(counter.get(), 1);
    }

    #[tokio::test]
    async fn test_discover_replaces_cache_and_diffs() {
        let lister = FakeDeviceLister::new("fake");
        lister.push_result(Ok(vec![dev("a"), dev("b")]));
        lister.push_result(Ok(vec![dev("b"), dev("c")]));
        let discovery = PollingDeviceDiscovery::new(lister);

        let mut added = discovery.on_added();
        let mut removed = discovery.on_removed();
        let filter = DeviceDiscoveryFilter::new();
        let timeout = Duration::from_secs(1);

        // First refresh populates; there is no previous list to diff.
        discovery.discover_devices(timeout, &filter).await.unwrap();
        assert!(added.try_recv().is_err());
        assert!(removed.try_recv().is_err());

        // Second refresh: exactly one added (c), one removed (a), none for b.
        let devices = discovery.discover_devices(timeout, &filter).await.unwrap();
        let ids: Vec<_> = devices.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        assert_eq!(added.try_recv().unwrap().id(), "c");
        assert!(added.try_recv().is_err());
        assert_eq!(removed.try_recv().unwrap().id(), "a");
        assert!(removed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_diff_ignores_attribute_changes() {
        let lister = FakeDeviceLister::new("fake");
        let old: Arc<dyn Device> = Arc::new(FakeDevice::new("a", "Old Name"));
        let renamed: Arc<dyn Device> = Arc::new(FakeDevice::new("a", "New Name"));
        lister.push_result(Ok(vec![old]));
        lister.push_result(Ok(vec![renamed]));
        let discovery = PollingDeviceDiscovery::new(lister);

        let mut added = discovery.on_added();
        let mut removed = discovery.on_removed();
        let filter = DeviceDiscoveryFilter::new();
        let timeout = Duration::from_secs(1);

        discovery.discover_devices(timeout, &filter).await.unwrap();
        discovery.discover_devices(timeout, &filter).await.unwrap();

        assert!(added.try_recv().is_err());
        assert!(removed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_timed_out_refresh_keeps_cache() {
        let lister = FakeDeviceLister::new("fake");
        lister.push_result(Ok(vec![dev("a")]));
        lister.push_result(Err(DiscoveryError::Timeout(Duration::from_secs(1))));
        let discovery = PollingDeviceDiscovery::new(lister);

        let filter = DeviceDiscoveryFilter::new();
        let timeout = Duration::from_secs(1);

        discovery.discover_devices(timeout, &filter).await.unwrap();
        let devices = discovery.discover_devices(timeout, &filter).await.unwrap();

        // Stale but intact.
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "a");
    }

    #[tokio::test]
    async fn test_polling_ticks_and_stops_on_disposal() {
        let lister = FakeDeviceLister::new("fake").repeating(vec![dev("a")]);
        let counter = lister.call_counter();
        let config = PollingConfig::fast()
            .with_initial_interval(Duration::from_millis(5))
            .with_steady_interval(Duration::from_millis(10));
        let discovery = PollingDeviceDiscovery::with_config(lister, config);

        assert!(!discovery.is_polling());
        discovery.start_polling();
        assert!(discovery.is_polling());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(counter.get() >= 2, "expected at least two ticks");

        discovery.stop_polling();
        assert!(!discovery.is_polling());
        let calls_at_stop = counter.get();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.get(), calls_at_stop, "tick after disposal");
    }

    #[tokio::test]
    async fn test_background_tick_fires_events() {
        let lister = FakeDeviceLister::new("fake");
        lister.push_result(Ok(vec![dev("a")]));
        lister.push_result(Ok(vec![dev("a"), dev("b")]));
        let config = PollingConfig::fast()
            .with_initial_interval(Duration::from_millis(5))
            .with_steady_interval(Duration::from_millis(10));
        let discovery = PollingDeviceDiscovery::with_config(lister, config);

        let mut added = discovery.on_added();
        discovery.start_polling();

        let event = tokio::time::timeout(Duration::from_secs(1), added.recv())
            .await
            .expect("no added event within a second")
            .unwrap();
        assert_eq!(event.id(), "b");

        discovery.stop_polling();
    }
}
