use jobtrack::cli::Cli;
use jobtrack::error::JobtrackError;
use jobtrack::logger::initialize as LoggerInitialize;
use jobtrack::pump::pump_host_messages;

use session_core::SessionStore;
use session_core::config::SessionConfig;
use session_core::config::env::load_dotenv;
use session_core::host::{InMemoryAddressBar, parse_host_app_config};
use session_core::storage::{FileTokenStorage, detect_data_dir};

use std::fs::create_dir_all;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info, warn};
use tokio::io::BufReader;
use tokio::sync::mpsc;

const HOST_MESSAGE_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), JobtrackError> {
    let log_dir = cli
        .log_dir()
        .ok_or_else(|| JobtrackError::jobtrack("Cannot determine log directory; pass --log-dir"))?;
    create_dir_all(&log_dir).map_err(|e| {
        JobtrackError::jobtrack(format!("Failed to create log directory: {e}"))
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("jobtrack session starting");
    info!("Log directory: {}", log_dir.display());

    match load_dotenv() {
        Some(path) => info!("Loaded .env from: {}", path.display()),
        None => debug!("No .env loaded"),
    }

    let mut config = match cli.config_dir() {
        Some(config_dir) => SessionConfig::load(&config_dir)?,
        None => {
            warn!("No config directory available, using defaults");
            SessionConfig::default()
        }
    };
    config.apply_env_overrides();
    if let Some(base_path) = &cli.api_base_path {
        config.api.api_base_path = Some(base_path.clone());
    }
    config.validate()?;

    let data_dir = detect_data_dir(config.storage.data_dir.as_deref())?;
    info!("Token storage: {} ({})", data_dir.path.display(), data_dir.source);

    let host_app = parse_host_app_config(&cli.url);
    if host_app.is_valid_build_url {
        info!(
            "Build URL: user={:?}, workspace={:?}",
            host_app.user_id, host_app.workspace_id
        );
    }

    let address_bar = InMemoryAddressBar::parse(&cli.url)
        .map_err(|e| JobtrackError::jobtrack(format!("Invalid page URL {}: {e}", cli.url)))?;

    let (sender, receiver) = mpsc::channel(HOST_MESSAGE_BUFFER);
    let store = SessionStore::builder()
        .with_config(&config)
        .with_storage(FileTokenStorage::new(data_dir.path))
        .with_address_bar(address_bar)
        .with_host_messages(receiver)
        .build()?;

    let subscription = store.subscribe(|snapshot| match serde_json::to_string(&snapshot.summary()) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("Failed to serialize session summary: {e}"),
    });

    let status = store.initialize().await;
    info!("Session ready: {status} (user: {:?})", store.user_id());

    let pump = tokio::spawn(pump_host_messages(
        BufReader::new(tokio::io::stdin()),
        sender,
    ));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutdown requested");
        }
        result = pump => {
            if let Err(e) = result {
                warn!("Host message input task failed: {e}");
            }
            store.drain_host_messages().await;
        }
    }

    store.dispose();
    subscription.unsubscribe();
    info!("jobtrack session stopped");

    Ok(())
}
