//! txnreview main entry point

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use txnreview_api::{start_server, AppState};
use txnreview_backend::FixtureDataService;
use txnreview_config::{Config, ConfigResult};

#[derive(Parser, Debug)]
#[command(name = "txnreview")]
#[command(version = "0.1.0")]
#[command(about = "Transaction approval dashboard over a fixture-backed data service", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

fn load_config(args: &Args) -> ConfigResult<Config> {
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
        config.validate()?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(&args)
        .map_err(|e| anyhow::anyhow!("{}", e.to_details()))
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();
    info!(
        "config loaded: fixture={}, page_size={}",
        config.backend.fixture_path.display(),
        config.backend.page_size
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let service = FixtureDataService::load(&config.backend)
            .await
            .with_context(|| format!("failed to load fixture {}", config.backend.fixture_path.display()))?;

        let state = AppState::new(config, Arc::new(service));
        if let Err(e) = state.view.ensure_bootstrapped().await {
            warn!("initial dashboard load failed, will retry on first request: {}", e);
        }

        start_server(state).await.context("server error")
    })
}
