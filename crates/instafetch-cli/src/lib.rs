//! Command-line interface for instafetch.
//!
//! - `parser` - Root CLI structure and global settings flags
//! - `commands` - Subcommands
//! - `handlers` - One module per subcommand
//! - `logging` - `tracing` subscriber setup
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used by main.rs
use dotenvy as _;

pub mod commands;
pub mod handlers;
pub mod logging;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::Commands;
pub use parser::{Cli, SettingsArgs};
