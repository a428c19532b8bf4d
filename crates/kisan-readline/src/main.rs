use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kisan_application::{ControllerSettings, EventSink, QueryController};
use kisan_core::config::{AppConfig, FetcherMode};
use kisan_infrastructure::{ConfigService, JsonHistoryRepository, KisanPaths};
use kisan_interaction::{build_fetcher, detect_capabilities};
use tokio::sync::mpsc;

mod cli_helper;
mod commands;
mod input;
mod logging;
mod repl;
mod view;

#[derive(Parser, Debug)]
#[command(name = "kisan")]
#[command(about = "Kisan - ask farming questions from your terminal", long_about = None)]
struct Cli {
    /// Directory holding config.toml, history.json and logs/
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of <data-dir>/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where answers come from: local or remote
    #[arg(long, value_name = "MODE")]
    mode: Option<FetcherMode>,

    /// Backend URL for remote mode
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Answer language code (e.g. en, hi)
    #[arg(long, value_name = "CODE")]
    lang: Option<String>,

    /// Do not look up the approximate location
    #[arg(long)]
    no_location: bool,
}

impl Cli {
    /// Command-line flags take precedence over config.toml.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.fetcher.mode = mode;
        }
        if let Some(endpoint) = &self.endpoint {
            config.fetcher.endpoint = Some(endpoint.clone());
            if self.mode.is_none() {
                config.fetcher.mode = FetcherMode::Remote;
            }
        }
        if let Some(lang) = &self.lang {
            config.language.default = lang.clone();
        }
        if self.no_location {
            config.location.enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = KisanPaths::new(cli.data_dir.clone());

    let _log_guard = logging::init(&paths.logs_dir()?)?;
    tracing::info!("[Startup] kisan {}", env!("CARGO_PKG_VERSION"));

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path.clone()),
        None => {
            let service = ConfigService::new(&paths)?;
            if let Err(e) = service.ensure_exists() {
                tracing::warn!("[Config] Could not write default config: {}", e);
            }
            service
        }
    };
    let mut config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    cli.apply(&mut config);

    let fetcher = build_fetcher(&config.fetcher)?;
    let repository = Arc::new(JsonHistoryRepository::new(&paths)?);
    let capabilities = detect_capabilities(&config);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let controller = QueryController::new(
        fetcher,
        repository,
        capabilities,
        ControllerSettings::from_config(&config),
        EventSink::new(event_tx),
    )
    .await;

    repl::Repl::new(controller, event_rx).run().await
}
