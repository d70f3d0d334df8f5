//! Marquee CLI binary.
//!
//! This binary provides command-line access to Marquee's functionality:
//! - Enrich work items read from JSON files
//! - Compute the content identifier of a file
//! - Show the effective configuration

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use cli::{Cli, Commands, EnrichOptions, address_file, enrich};

    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    marquee::init_tracing(log_level, cli.log_format.into())?;

    let config = marquee::MarqueeConfig::load()?;

    // Execute the requested command
    match cli.command {
        Commands::Enrich {
            items,
            force,
            concurrency,
        } => {
            enrich(
                &config,
                EnrichOptions {
                    items,
                    force,
                    concurrency,
                },
            )
            .await?;
        }

        Commands::Address { path } => {
            address_file(&config, &path).await?;
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}
