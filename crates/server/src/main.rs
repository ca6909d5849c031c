use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::database::connection::DbConnection;

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod database;
pub(crate) mod error;
pub(crate) mod models;
pub(crate) mod search;
pub(crate) mod server;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(version, about = "Directory of learning resources over HTTP")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Default, Subcommand)]
enum Command {
    /// Create missing tables and start serving requests
    #[default]
    Serve,
    /// Create missing tables and exit
    InitSchema,
    /// Drop every table and exit
    DropSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = AppConfig::from_yaml_file(args.config)?;

    match args.command.unwrap_or_default() {
        Command::Serve => server::run_all(&config).await?,
        Command::InitSchema => {
            let db = DbConnection::connect(&config.database).await?;
            db.init_schema().await?;
            db.close().await;
        }
        Command::DropSchema => {
            let db = DbConnection::connect(&config.database).await?;
            db.drop_schema().await?;
            db.close().await;
        }
    }

    Ok(())
}
