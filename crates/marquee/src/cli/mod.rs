//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the marquee binary.

mod address;
mod commands;
mod enrich;

pub use address::address_file;
pub use commands::{Cli, Commands, LogOutput};
pub use enrich::{EnrichOptions, enrich};
