//! CLI module for the device discovery tool
//!
//! This module contains all command-line interface related code.
//!
//! # Submodules
//!
//! - `args` - Argument and subcommand definitions (clap)
//! - `commands` - Command handler implementations

pub mod args;
pub mod commands;

pub use args::{Args, Commands, ConfigCommands};
