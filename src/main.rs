//! Library Catalog Service
//!
//! An in-memory book catalog served over HTTP with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 LIBRARY CATALOG                  │
//!                      │                                                  │
//!     Client Request   │  ┌─────────┐    ┌──────────────┐   ┌──────────┐  │
//!     ─────────────────┼─▶│  http   │───▶│   routing    │──▶│ dispatch │  │
//!                      │  │ server  │    │ route table  │   │          │  │
//!                      │  └─────────┘    └──────────────┘   └────┬─────┘  │
//!                      │                                         │        │
//!                      │                                         ▼        │
//!     Client Response  │  ┌─────────┐                      ┌──────────┐   │
//!     ◀────────────────┼──│ status  │◀─────────────────────│ catalog  │   │
//!                      │  │ + body  │                      │  store   │   │
//!                      │  └─────────┘                      └──────────┘   │
//!                      │                                                  │
//!                      │  config · observability · lifecycle              │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use library_catalog::config::{load_config, CatalogConfig};
use library_catalog::lifecycle::startup;

#[derive(Parser)]
#[command(name = "library-catalog")]
#[command(about = "In-memory book catalog served over HTTP", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    startup::run(config).await?;
    Ok(())
}
