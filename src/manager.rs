//! Device manager
//!
//! The top-level façade over all registered discovery backends. Applies the
//! process's selection intent (a concrete ID, `"all"`, or unset), fans
//! queries out to every platform-eligible backend concurrently, and resolves
//! the race between them into one consistent result set.
//!
//! The manager never mutates backend-internal state; it only reads through
//! the [`DeviceDiscovery`] contract. Backend failures during aggregate
//! operations are logged at trace level and contribute zero devices — they
//! never abort the other backends or propagate to the caller.

use crate::device::traits::{is_exact_match, is_prefix_match, Device, Project};
use crate::discovery::backend::DeviceDiscovery;
use crate::discovery::filter::{DeviceDiscoveryFilter, DeviceDiscoverySupportFilter};
use log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

/// Sentinel device identifier selecting every eligible device
pub const ALL_DEVICES_ID: &str = "all";

/// Per-backend outcome of an ID query, tagged with the backend's
/// registration index so fallback results keep registration order
struct IdQueryResult {
    backend_index: usize,
    exact: Option<Arc<dyn Device>>,
    prefix_matches: Vec<Arc<dyn Device>>,
}

/// Aggregates N discovery backends behind one selection API
///
/// Construction is cheap: no backend performs I/O until the first query.
/// Create one instance at process start and pass it explicitly to every
/// consumer.
pub struct DeviceManager {
    discoverers: Vec<Arc<dyn DeviceDiscovery>>,
    /// Selection intent: unset, a concrete ID/name, or [`ALL_DEVICES_ID`].
    /// Set at most once per run, before the first query.
    specified_device_id: RwLock<Option<String>>,
}

impl DeviceManager {
    /// Create a manager over the given backends, in registration order
    pub fn new(discoverers: Vec<Arc<dyn DeviceDiscovery>>) -> Self {
        Self {
            discoverers,
            specified_device_id: RwLock::new(None),
        }
    }

    // -------------------------------------------------------------------------
    // Selection intent
    // -------------------------------------------------------------------------

    /// Record the user-supplied device identifier (or `"all"`).
    ///
    /// Intended to be called exactly once per run, by the CLI layer, before
    /// any query.
    pub fn set_specified_device_id(&self, id: Option<String>) {
        *self.specified_device_id.write().unwrap() = id;
    }

    /// The concrete specified ID, or `None` when unset or `"all"`
    pub fn specified_device_id(&self) -> Option<String> {
        let id = self.specified_device_id.read().unwrap();
        match id.as_deref() {
            Some(ALL_DEVICES_ID) | None => None,
            Some(concrete) => Some(concrete.to_string()),
        }
    }

    /// Whether a concrete device ID was specified (not unset, not `"all"`)
    pub fn has_specified_device_id(&self) -> bool {
        self.specified_device_id().is_some()
    }

    /// Whether the `"all"` sentinel was specified
    pub fn has_specified_all_devices(&self) -> bool {
        self.specified_device_id
            .read()
            .unwrap()
            .as_deref()
            .map_or(false, |id| id == ALL_DEVICES_ID)
    }

    // -------------------------------------------------------------------------
    // Aggregate queries
    // -------------------------------------------------------------------------

    /// Backends that can produce anything on this host, with their
    /// registration indices
    fn eligible_backends(&self) -> Vec<(usize, Arc<dyn DeviceDiscovery>)> {
        self.discoverers
            .iter()
            .enumerate()
            .filter(|(_, d)| d.supports_platform())
            .map(|(i, d)| (i, Arc::clone(d)))
            .collect()
    }

    /// Query every eligible backend concurrently and concatenate results:
    /// backends in registration order, devices in per-backend order
    pub async fn get_all_devices(&self, filter: &DeviceDiscoveryFilter) -> Vec<Arc<dyn Device>> {
        self.collect_from_backends(filter, None).await
    }

    /// Force a fresh scan on every eligible backend concurrently.
    ///
    /// The timeout applies per backend, not as one pooled deadline.
    pub async fn refresh_all_devices(
        &self,
        timeout: Duration,
        filter: &DeviceDiscoveryFilter,
    ) -> Vec<Arc<dyn Device>> {
        self.collect_from_backends(filter, Some(timeout)).await
    }

    /// Shared fan-out for `get_all_devices`/`refresh_all_devices`.
    /// `refresh_timeout` selects the forced-refresh path.
    async fn collect_from_backends(
        &self,
        filter: &DeviceDiscoveryFilter,
        refresh_timeout: Option<Duration>,
    ) -> Vec<Arc<dyn Device>> {
        let backends = self.eligible_backends();
        let (tx, mut rx) = mpsc::channel(backends.len().max(1));

        let expected = backends.len();
        for (index, backend) in backends {
            let tx = tx.clone();
            let filter = filter.clone();
            tokio::spawn(async move {
                let result = match refresh_timeout {
                    Some(timeout) => backend.discover_devices(timeout, &filter).await,
                    None => backend.devices(&filter).await,
                };
                let devices = result.unwrap_or_else(|e| {
                    trace!("backend '{}' failed to list devices: {}", backend.name(), e);
                    Vec::new()
                });
                let _ = tx.send((index, devices)).await;
            });
        }
        drop(tx);

        // Completion order is arbitrary; reassemble in registration order.
        let mut by_backend: BTreeMap<usize, Vec<Arc<dyn Device>>> = BTreeMap::new();
        while let Some((index, devices)) = rx.recv().await {
            by_backend.insert(index, devices);
            if by_backend.len() == expected {
                break;
            }
        }
        by_backend.into_values().flatten().collect()
    }

    /// Resolve a user-supplied identifier to devices.
    ///
    /// Backends race: the first exact match (case-insensitive ID or name
    /// equality) resolves immediately and the remaining in-flight backends'
    /// results are discarded — their tasks run to completion detached, only
    /// the result channel is dropped. If no backend produces an exact match,
    /// the full prefix-match candidate list (possibly empty) is returned
    /// once all backends have completed, in registration order.
    pub async fn get_devices_by_id(
        &self,
        device_id: &str,
        filter: &DeviceDiscoveryFilter,
    ) -> Vec<Arc<dyn Device>> {
        let mut backends = self.eligible_backends();

        // Well-known short-circuit: when some backend can resolve this ID
        // without I/O, backends that could never produce it are not queried.
        let id_lower = device_id.to_lowercase();
        let declaring: Vec<(usize, Arc<dyn DeviceDiscovery>)> = backends
            .iter()
            .filter(|(_, d)| {
                d.well_known_ids()
                    .iter()
                    .any(|known| known.to_lowercase() == id_lower)
            })
            .map(|(i, d)| (*i, Arc::clone(d)))
            .collect();
        if !declaring.is_empty() {
            debug!("'{}' is well known, querying {} backend(s)", device_id, declaring.len());
            backends = declaring;
        }

        let expected = backends.len();
        let (tx, mut rx) = mpsc::channel(expected.max(1));

        for (index, backend) in backends {
            let tx = tx.clone();
            let filter = filter.clone();
            let query = device_id.to_string();
            tokio::spawn(async move {
                let devices = match backend.devices(&filter).await {
                    Ok(devices) => devices,
                    Err(e) => {
                        trace!("backend '{}' failed during ID lookup: {}", backend.name(), e);
                        Vec::new()
                    }
                };

                let mut exact = None;
                let mut prefix_matches = Vec::new();
                for device in devices {
                    if is_exact_match(&device, &query) {
                        exact = Some(device);
                        break;
                    }
                    if is_prefix_match(&device, &query) {
                        prefix_matches.push(device);
                    }
                }

                let _ = tx
                    .send(IdQueryResult {
                        backend_index: index,
                        exact,
                        prefix_matches,
                    })
                    .await;
            });
        }
        drop(tx);

        let mut candidates: BTreeMap<usize, Vec<Arc<dyn Device>>> = BTreeMap::new();
        while let Some(result) = rx.recv().await {
            if let Some(device) = result.exact {
                // First exact match wins; dropping the receiver lets the
                // losing backends finish in the background.
                return vec![device];
            }
            candidates.insert(result.backend_index, result.prefix_matches);
            if candidates.len() == expected {
                break;
            }
        }
        candidates.into_values().flatten().collect()
    }

    /// Resolve the selection intent: a concrete ID delegates to
    /// [`get_devices_by_id`](Self::get_devices_by_id), everything else to
    /// [`get_all_devices`](Self::get_all_devices)
    pub async fn get_devices(&self, filter: &DeviceDiscoveryFilter) -> Vec<Arc<dyn Device>> {
        match self.specified_device_id() {
            Some(id) => self.get_devices_by_id(&id, filter).await,
            None => self.get_all_devices(filter).await,
        }
    }

    // -------------------------------------------------------------------------
    // Selection helpers
    // -------------------------------------------------------------------------

    /// Derive the support filter matching the current selection intent.
    ///
    /// `"all"` gets the all-aware variant; a concrete ID gets the tool-only
    /// variant (an explicit ID overrides project suitability); unset gets
    /// the project-aware variant. `include_unsupported_by_project` suppresses
    /// the project context entirely.
    pub fn build_selection_filter(
        &self,
        project: Option<Project>,
        include_unsupported_by_project: bool,
    ) -> DeviceDiscoverySupportFilter {
        let project = if include_unsupported_by_project {
            None
        } else {
            project
        };

        if self.has_specified_all_devices() {
            DeviceDiscoverySupportFilter::exclude_unsupported_by_all(project)
        } else if self.has_specified_device_id() {
            DeviceDiscoverySupportFilter::exclude_unsupported_by_tool()
        } else {
            DeviceDiscoverySupportFilter::exclude_unsupported_by_tool_or_project(project)
        }
    }

    /// The ambient default target: the single ephemeral device, if the list
    /// contains exactly one and no concrete ID was specified.
    ///
    /// Returns `None` (not an error) for zero or multiple candidates.
    pub fn get_single_ephemeral_device(
        &self,
        devices: &[Arc<dyn Device>],
    ) -> Option<Arc<dyn Device>> {
        if self.has_specified_device_id() {
            return None;
        }

        let mut ephemeral = devices.iter().filter(|d| d.is_ephemeral());
        match (ephemeral.next(), ephemeral.next()) {
            (Some(device), None) => Some(Arc::clone(device)),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    /// Whether any eligible backend can currently list devices
    pub async fn can_list_anything(&self) -> bool {
        for (_, backend) in self.eligible_backends() {
            if backend.can_list_anything().await {
                return true;
            }
        }
        false
    }

    /// Every eligible backend's diagnostic messages, in registration order
    pub async fn get_diagnostics(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for (_, backend) in self.eligible_backends() {
            messages.extend(backend.diagnostics().await);
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDevice, FakeDeviceDiscovery};
    use std::time::Instant;

    fn dev(id: &str, name: &str) -> Arc<dyn Device> {
        Arc::new(FakeDevice::new(id, name))
    }

    fn manager(backends: Vec<FakeDeviceDiscovery>) -> DeviceManager {
        DeviceManager::new(
            backends
                .into_iter()
                .map(|b| Arc::new(b) as Arc<dyn DeviceDiscovery>)
                .collect(),
        )
    }

    #[test]
    fn test_selection_intent_states() {
        let m = manager(vec![]);
        assert!(!m.has_specified_device_id());
        assert!(!m.has_specified_all_devices());

        m.set_specified_device_id(Some("all".to_string()));
        assert!(!m.has_specified_device_id());
        assert!(m.has_specified_all_devices());
        assert_eq!(m.specified_device_id(), None);

        let m = manager(vec![]);
        m.set_specified_device_id(Some("pixel".to_string()));
        assert!(m.has_specified_device_id());
        assert!(!m.has_specified_all_devices());
        assert_eq!(m.specified_device_id(), Some("pixel".to_string()));
    }

    #[tokio::test]
    async fn test_get_all_devices_preserves_registration_order() {
        // Backend B completes first; concatenation order must not care.
        let a = FakeDeviceDiscovery::new("a")
            .with_devices(vec![dev("a1", "a1"), dev("a2", "a2")])
            .with_delay(Duration::from_millis(20));
        let b = FakeDeviceDiscovery::new("b").with_devices(vec![dev("b1", "b1")]);

        let m = manager(vec![a, b]);
        let devices = m.get_all_devices(&DeviceDiscoveryFilter::new()).await;
        let ids: Vec<_> = devices.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
    }

    #[tokio::test]
    async fn test_unsupported_platform_backend_is_excluded() {
        let supported = FakeDeviceDiscovery::new("supported").with_devices(vec![dev("s", "s")]);
        let unsupported = FakeDeviceDiscovery::new("unsupported")
            .with_devices(vec![dev("u", "u")])
            .platform_unsupported();

        let m = manager(vec![unsupported, supported]);
        let devices = m.get_all_devices(&DeviceDiscoveryFilter::new()).await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "s");
    }

    #[tokio::test]
    async fn test_failing_backend_contributes_zero_devices() {
        let healthy = FakeDeviceDiscovery::new("healthy").with_devices(vec![dev("h", "h")]);
        let broken = FakeDeviceDiscovery::new("broken").failing();

        let m = manager(vec![broken, healthy]);
        let devices = m.get_all_devices(&DeviceDiscoveryFilter::new()).await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "h");
    }

    #[tokio::test]
    async fn test_exact_match_wins_without_waiting_for_hung_backend() {
        // A: exact match after 10ms. B: prefix match after 5ms. C: hangs.
        let a = FakeDeviceDiscovery::new("a")
            .with_devices(vec![dev("pixel-8", "Pixel 8")])
            .with_delay(Duration::from_millis(10));
        let b = FakeDeviceDiscovery::new("b")
            .with_devices(vec![dev("pixel-fold", "Pixel Fold")])
            .with_delay(Duration::from_millis(5));
        let c = FakeDeviceDiscovery::new("c").hanging();

        let m = manager(vec![a, b, c]);
        let start = Instant::now();
        let devices = m
            .get_devices_by_id("pixel-8", &DeviceDiscoveryFilter::new())
            .await;

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "pixel-8");
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "resolved only after the hung backend"
        );
    }

    #[tokio::test]
    async fn test_prefix_fallback_in_registration_order() {
        let a = FakeDeviceDiscovery::new("a")
            .with_devices(vec![dev("pixel-fold", "Pixel Fold")])
            .with_delay(Duration::from_millis(10));
        let b = FakeDeviceDiscovery::new("b").with_devices(vec![dev("pixel-8", "Pixel 8")]);

        let m = manager(vec![a, b]);
        let devices = m
            .get_devices_by_id("pix", &DeviceDiscoveryFilter::new())
            .await;
        let ids: Vec<_> = devices.iter().map(|d| d.id().to_string()).collect();
        // b finished first, but a was registered first.
        assert_eq!(ids, vec!["pixel-fold", "pixel-8"]);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let a = FakeDeviceDiscovery::new("a").with_devices(vec![dev("mac", "macOS")]);
        let m = manager(vec![a]);
        let devices = m
            .get_devices_by_id("windows", &DeviceDiscoveryFilter::new())
            .await;
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn test_well_known_id_short_circuits_other_backends() {
        let windows = FakeDeviceDiscovery::new("windows")
            .with_devices(vec![dev("windows", "Windows Desktop")])
            .with_well_known_ids(vec!["windows"]);
        let android = FakeDeviceDiscovery::new("android").with_devices(vec![dev("pixel", "Pixel")]);
        let android_calls = android.devices_call_counter();

        let m = manager(vec![android, windows]);
        let devices = m
            .get_devices_by_id("windows", &DeviceDiscoveryFilter::new())
            .await;

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "windows");
        assert_eq!(android_calls.get(), 0, "non-declaring backend was queried");
    }

    #[tokio::test]
    async fn test_get_devices_delegates_by_intent() {
        let a = FakeDeviceDiscovery::new("a")
            .with_devices(vec![dev("pixel", "Pixel"), dev("mac", "macOS")]);
        let m = manager(vec![a]);

        let all = m.get_devices(&DeviceDiscoveryFilter::new()).await;
        assert_eq!(all.len(), 2);

        m.set_specified_device_id(Some("pixel".to_string()));
        let picked = m.get_devices(&DeviceDiscoveryFilter::new()).await;
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id(), "pixel");
    }

    #[tokio::test]
    async fn test_refresh_all_devices_forces_scan() {
        let a = FakeDeviceDiscovery::new("a").with_devices(vec![dev("d", "d")]);
        let discover_calls = a.discover_call_counter();

        let m = manager(vec![a]);
        m.refresh_all_devices(Duration::from_secs(5), &DeviceDiscoveryFilter::new())
            .await;
        assert_eq!(discover_calls.get(), 1);
    }

    #[test]
    fn test_single_ephemeral_device() {
        let m = manager(vec![]);
        let phone: Arc<dyn Device> = Arc::new(FakeDevice::new("phone", "Phone").ephemeral());
        let desktop = dev("desktop", "Desktop");
        let second_phone: Arc<dyn Device> =
            Arc::new(FakeDevice::new("phone2", "Phone 2").ephemeral());

        let list = vec![Arc::clone(&phone), Arc::clone(&desktop)];
        assert_eq!(
            m.get_single_ephemeral_device(&list).map(|d| d.id().to_string()),
            Some("phone".to_string())
        );

        // Two ephemeral candidates: ambiguous, so None.
        let list = vec![phone, second_phone, Arc::clone(&desktop)];
        assert!(m.get_single_ephemeral_device(&list).is_none());

        // No ephemeral candidates at all: None.
        let list = vec![desktop];
        assert!(m.get_single_ephemeral_device(&list).is_none());
    }

    #[test]
    fn test_single_ephemeral_not_applicable_with_specified_id() {
        let m = manager(vec![]);
        m.set_specified_device_id(Some("phone".to_string()));
        let list: Vec<Arc<dyn Device>> =
            vec![Arc::new(FakeDevice::new("phone", "Phone").ephemeral())];
        assert!(m.get_single_ephemeral_device(&list).is_none());
    }

    #[tokio::test]
    async fn test_build_selection_filter_variants() {
        let project = Project::new("/tmp/app");
        let unsupported_for_project: Arc<dyn Device> =
            Arc::new(FakeDevice::new("d", "d").unsupported_for_project());

        // Unset intent: project-aware.
        let m = manager(vec![]);
        let filter = m.build_selection_filter(Some(project.clone()), false);
        assert!(!filter.matches(&unsupported_for_project).await);

        // Concrete ID: tool-only, project suitability overridden.
        m.set_specified_device_id(Some("d".to_string()));
        let filter = m.build_selection_filter(Some(project.clone()), false);
        assert!(filter.matches(&unsupported_for_project).await);

        // include_unsupported_by_project drops the project context.
        let m = manager(vec![]);
        let filter = m.build_selection_filter(Some(project), true);
        assert!(filter.matches(&unsupported_for_project).await);
    }

    #[tokio::test]
    async fn test_can_list_anything_and_diagnostics() {
        let healthy = FakeDeviceDiscovery::new("healthy");
        let sick = FakeDeviceDiscovery::new("sick")
            .cannot_list()
            .with_diagnostics(vec!["adb not found on PATH"]);

        let m = manager(vec![sick, healthy]);
        assert!(m.can_list_anything().await);
        assert_eq!(m.get_diagnostics().await, vec!["adb not found on PATH"]);

        let m = manager(vec![FakeDeviceDiscovery::new("sick").cannot_list()]);
        assert!(!m.can_list_anything().await);
    }
}
