//! Gantry CLI
//!
//! Command-line interface for assembling and running pipelines against the
//! storage and compute-session services.

mod commands;
mod config;
mod id_resolver;
mod notify;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "Gantry pipeline CLI", long_about = None)]
struct Cli {
    /// Storage service URL
    #[arg(
        long,
        env = "GANTRY_STORAGE_URL",
        default_value = "http://localhost:8081"
    )]
    storage_url: String,

    /// Session service URL
    #[arg(
        long,
        env = "GANTRY_SESSION_URL",
        default_value = "http://localhost:8080"
    )]
    session_url: String,

    /// Compute domain sessions are created in
    #[arg(long, env = "GANTRY_DOMAIN", default_value = "default")]
    domain: String,

    /// Compute group sessions are created in
    #[arg(long, env = "GANTRY_GROUP", default_value = "default")]
    group: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gantry=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        storage_url: cli.storage_url,
        session_url: cli.session_url,
        domain: cli.domain,
        group: cli.group,
    };

    handle_command(cli.command, &config).await
}
