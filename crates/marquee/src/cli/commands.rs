//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use marquee::LogFormat;
use std::path::PathBuf;

/// Marquee - media metadata enrichment from content-addressed files
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(about = "Identify media files by content, resolve them against a catalog and enrich a metadata store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogOutput,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enrich work items read from JSON files
    Enrich {
        /// Files holding one work item or an array of work items
        #[arg(required = true)]
        items: Vec<PathBuf>,

        /// Re-resolve items that already carry a catalog id and ignore the cache
        #[arg(long)]
        force: bool,

        /// Maximum number of items processed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the content identifier of a file on the configured byte source
    Address {
        /// Path relative to the byte source
        path: String,
    },

    /// Print the effective configuration with secrets masked
    Config,
}

/// Log output format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogOutput {
    /// Human-readable lines
    Text,
    /// JSON lines
    Json,
}

impl From<LogOutput> for LogFormat {
    fn from(output: LogOutput) -> Self {
        match output {
            LogOutput::Text => LogFormat::Text,
            LogOutput::Json => LogFormat::Json,
        }
    }
}
