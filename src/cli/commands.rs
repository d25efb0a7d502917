//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands. Each
//! handler builds a [`DeviceManager`] over the registered backends, applies
//! the selection intent from config/flags, and renders the result.

use crate::backend::host::HostDeviceLister;
use crate::cli::{Args, Commands, ConfigCommands};
use crate::core::config::{get_config_path, init_config, Config};
use crate::device::traits::{device_summary, Device};
use crate::discovery::backend::DeviceDiscovery;
use crate::discovery::filter::DeviceDiscoveryFilter;
use crate::discovery::polling::PollingDeviceDiscovery;
use crate::manager::DeviceManager;
use anyhow::Result;
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// The host backend plus its concrete handle (needed for event
/// subscriptions, which are not part of the backend contract)
struct Backends {
    host: Arc<PollingDeviceDiscovery<HostDeviceLister>>,
}

impl Backends {
    fn new(config: &Config) -> Self {
        Self {
            host: Arc::new(PollingDeviceDiscovery::with_config(
                HostDeviceLister,
                config.discovery.polling_config(),
            )),
        }
    }

    fn manager(&self, config: &Config, args: &Args) -> DeviceManager {
        let manager = DeviceManager::new(vec![
            Arc::clone(&self.host) as Arc<dyn DeviceDiscovery>
        ]);

        // CLI flag wins over the config file; set exactly once per run.
        let intent = args
            .device_id
            .clone()
            .or_else(|| config.device.device_id.clone());
        manager.set_specified_device_id(intent);
        manager
    }
}

/// Dispatch the parsed command
pub async fn run(args: Args, config: Config) -> Result<()> {
    let backends = Backends::new(&config);
    let manager = backends.manager(&config, &args);

    match args.command.as_ref() {
        None => list_devices(&manager, false, None).await,
        Some(Commands::List { machine }) => list_devices(&manager, *machine, None).await,
        Some(Commands::Refresh { timeout, machine }) => {
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.discovery.refresh_timeout());
            list_devices(&manager, *machine, Some(timeout)).await
        }
        Some(Commands::Diagnose) => diagnose(&manager).await,
        Some(Commands::Watch) => watch(&backends).await,
        Some(Commands::Config { action }) => handle_config(action),
    }
}

/// List devices matching the selection intent; `refresh_timeout` forces a
/// fresh scan first
async fn list_devices(
    manager: &DeviceManager,
    machine: bool,
    refresh_timeout: Option<Duration>,
) -> Result<()> {
    let filter = DeviceDiscoveryFilter::new()
        .with_support_filter(manager.build_selection_filter(None, false));

    let devices = match refresh_timeout {
        Some(timeout) => manager.refresh_all_devices(timeout, &filter).await,
        None => manager.get_devices(&filter).await,
    };

    if devices.is_empty() {
        if !manager.can_list_anything().await {
            eprintln!("No backend can list devices on this host.");
        }
        for message in manager.get_diagnostics().await {
            eprintln!("  • {}", message);
        }
        println!("No devices found.");
        return Ok(());
    }

    if machine {
        let mut summaries = Vec::with_capacity(devices.len());
        for device in &devices {
            summaries.push(device_summary(device).await);
        }
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_device_table(&devices).await;
    }

    if let Some(default) = manager.get_single_ephemeral_device(&devices) {
        info!("default target: {} ({})", default.name(), default.id());
    }

    Ok(())
}

/// Human-readable device table
async fn print_device_table(devices: &[Arc<dyn Device>]) {
    println!("{} connected device(s):\n", devices.len());
    for device in devices {
        let platform = device.target_platform().await;
        let sdk = device
            .sdk_name_and_version()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        println!(
            "  {} ({}) • {} • {} • {}",
            device.name(),
            device.id(),
            platform,
            device.connection_interface(),
            sdk
        );
    }
}

/// Print every backend's diagnostics
async fn diagnose(manager: &DeviceManager) -> Result<()> {
    let messages = manager.get_diagnostics().await;
    if messages.is_empty() {
        println!("No issues found.");
    } else {
        for message in messages {
            println!("  • {}", message);
        }
    }
    Ok(())
}

/// Stream added/removed events until Ctrl-C
async fn watch(backends: &Backends) -> Result<()> {
    let mut added = backends.host.on_added();
    let mut removed = backends.host.on_removed();
    backends.host.start_polling();

    println!("Watching for device changes (Ctrl-C to stop)...");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = added.recv() => {
                if let Ok(device) = event {
                    println!("+ {} ({})", device.name(), device.id());
                }
            }
            event = removed.recv() => {
                if let Ok(device) = event {
                    println!("- {} ({})", device.name(), device.id());
                }
            }
        }
    }

    backends.host.stop_polling();
    info!("watch stopped");
    Ok(())
}

/// Config file management
fn handle_config(action: &ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Init => {
            let path = init_config()?;
            println!("Config file: {}", path.display());
        }
        ConfigCommands::Path => match get_config_path() {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("Could not determine config path."),
        },
    }
    Ok(())
}
