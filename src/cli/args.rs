//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Discover and select deployment targets across all connected devices
#[derive(Parser, Debug)]
#[command(name = "device-roster")]
#[command(version = "1.0.0")]
#[command(
    about = "Discover and select deployment targets across all connected devices",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Device ID or name to target; "all" selects every eligible device
    #[arg(short, long, global = true)]
    pub device_id: Option<String>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List devices matching the selection intent (default command)
    List {
        /// Emit machine-readable JSON summaries instead of a table
        #[arg(long)]
        machine: bool,
    },

    /// Force a fresh scan on every backend, then list
    Refresh {
        /// Per-backend scan budget in seconds (overrides config)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Emit machine-readable JSON summaries instead of a table
        #[arg(long)]
        machine: bool,
    },

    /// Report backend problems preventing device discovery
    Diagnose,

    /// Watch for devices being added and removed until Ctrl-C
    Watch,

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Create the default config file if it doesn't exist
    Init,
    /// Print the config file path
    Path,
}
