mod config;
mod core;
mod dataset;
mod fetch;
mod pipeline;
mod server;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::config::AppCfg;
use crate::store::files::CompositeStore;

/// AI-progress clock: fetches public AI-research datasets and serves the
/// composite score over HTTP.
#[derive(Parser)]
#[command(name = "aiclock")]
#[command(about = "Fetches AI-research datasets and serves a composite clock score")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the datasets and refresh the composite snapshot once
    Update,
    /// Serve the composite snapshot over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let cfg = match AppCfg::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, cfg).await {
        Ok(code) => code,
        Err(e) => {
            error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, cfg: AppCfg) -> Result<ExitCode> {
    match command {
        Commands::Update => {
            let client = build_client(&cfg)?;
            let store = CompositeStore::new(&cfg.store.data_dir);
            let outcome = pipeline::update::run_update(&client, &cfg, &store).await?;
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Commands::Serve => {
            let store = Arc::new(CompositeStore::new(&cfg.store.data_dir));
            let shutdown = CancellationToken::new();

            let token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown requested");
                    token.cancel();
                }
            });

            server::routes::serve(store, &cfg.server.bind_addr, shutdown).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_client(cfg: &AppCfg) -> Result<Client> {
    Client::builder()
        .user_agent(cfg.http.user_agent.clone())
        .pool_idle_timeout(cfg.http.pool_idle_timeout)
        .pool_max_idle_per_host(cfg.http.pool_max_idle_per_host)
        .tcp_keepalive(cfg.http.tcp_keep_alive)
        .timeout(cfg.http.timeout)
        .build()
        .context("building http client")
}
