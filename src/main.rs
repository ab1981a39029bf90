mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod view;
mod workflow;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::render::{self, RenderArgs};
use crate::cmd::serve::{self, ServeArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::launchpad::LaunchpadClient;

#[derive(Parser)]
#[command(name = "bug-dashboard", author, version, about = "Launchpad bug dashboard")]
struct Cli {
    /// Path to the dashboard configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP.
    Serve(ServeArgs),
    /// Fetch once and write the dashboard HTML.
    Render(RenderArgs),
    /// Inspect the configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command, cli.config.as_deref()),
        Commands::Serve(args) => {
            let ctx = build_context(cli.config.as_deref())?;
            serve::run(ctx, args).await
        }
        Commands::Render(args) => {
            let ctx = build_context(cli.config.as_deref())?;
            render::run(&ctx, args).await
        }
    }
}

fn build_context(explicit: Option<&Path>) -> AppResult<AppContext> {
    let config = AppConfig::load(explicit)?;
    info!(
        project = %config.name,
        projects = config.projects.len(),
        tagged = config.tagged_projects.len(),
        "configuration loaded"
    );

    let timeout = Duration::from_secs(config.fetch.request_timeout_secs);
    let launchpad = Arc::new(LaunchpadClient::new(timeout)?);
    AppContext::new(config, launchpad)
}
