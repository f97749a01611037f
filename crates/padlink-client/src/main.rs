//! padlink host client entry point.
//!
//! Wires the settings store, the device link, the key injector and the UI
//! state together, then waits for Ctrl+C.
//!
//! ```text
//! main()
//!  ├─ load config.toml            -> SettingsStore (defaults written on first run)
//!  ├─ DeviceLink::spawn()         -> session task + injection worker
//!  ├─ spawn_state_updater()       -> AppState for a front end
//!  ├─ auto-connect after delay
//!  └─ Ctrl+C                      -> disconnect, shutdown
//! ```
//!
//! # Usage
//!
//! ```text
//! padlink [OPTIONS]
//!
//! Options:
//!   --host <HOST>         Controller host for this run [env: PADLINK_HOST]
//!   --config <PATH>       Settings file [env: PADLINK_CONFIG]
//!   --no-auto-connect     Do not dial the controller at startup
//!   --log-level <LEVEL>   Log level when RUST_LOG is unset [env: PADLINK_LOG]
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use padlink_client::application::notify::Notifier;
use padlink_client::infrastructure::{
    input_injection::LoggingInjector,
    link::{DeviceLink, WsConnector},
    storage::{
        config::{config_file_path, load_config, load_config_from, save_config, AppConfig},
        SettingsStore,
    },
    ui_bridge::{spawn_state_updater, AppState},
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Turns touch-panel button presses into key presses on this machine.
#[derive(Debug, Parser)]
#[command(name = "padlink", version)]
struct Cli {
    /// Controller hostname or IP address.  Overrides the settings file.
    #[arg(long, env = "PADLINK_HOST")]
    host: Option<String>,

    /// Path of the settings file.  Defaults to the platform config directory.
    #[arg(long, env = "PADLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Do not connect automatically at startup.
    #[arg(long)]
    no_auto_connect: bool,

    /// Log level used when `RUST_LOG` is unset.  Overrides the settings file.
    #[arg(long, env = "PADLINK_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// Resolves the settings file path and loads it.
    fn load_settings(&self) -> anyhow::Result<(AppConfig, Option<PathBuf>)> {
        let (mut config, path) = match &self.config {
            Some(path) => {
                let config = load_config_from(path)
                    .with_context(|| format!("failed to load settings from {}", path.display()))?;
                (config, Some(path.clone()))
            }
            None => match config_file_path() {
                Ok(path) => {
                    let config = load_config()
                        .with_context(|| format!("failed to load settings from {}", path.display()))?;
                    (config, Some(path))
                }
                Err(_) => (AppConfig::default(), None),
            },
        };

        if let Some(host) = &self.host {
            config.controller.host = host.trim().to_string();
        }
        if let Some(level) = &self.log_level {
            config.app.log_level = level.clone();
        }
        if self.no_auto_connect {
            config.app.auto_connect = false;
        }
        Ok((config, path))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let first_run = cli.config.is_none()
        && config_file_path().map(|path| !path.exists()).unwrap_or(false);
    let (config, path) = cli.load_settings()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.app.log_level)),
        )
        .init();

    info!("padlink starting");
    match &path {
        Some(path) => info!("settings file: {}", path.display()),
        None => warn!("no platform config directory; settings will not be saved"),
    }
    if first_run {
        match save_config(&AppConfig::default()) {
            Ok(()) => info!("wrote default settings"),
            Err(e) => warn!("could not write default settings: {e}"),
        }
    }
    info!(
        "autostart is {}",
        if config.app.autostart { "enabled" } else { "disabled" }
    );

    let link_config = config.link.to_link_config();
    let auto_connect = config.app.auto_connect;
    let auto_connect_delay = Duration::from_millis(config.app.auto_connect_delay_ms);

    let store = Arc::new(SettingsStore::new(config, path));

    let notifier = Notifier::default();
    let app_state = AppState::new();
    let _state_updater = spawn_state_updater(Arc::clone(&app_state), notifier.subscribe());

    // ── Device link ───────────────────────────────────────────────────────────
    // LoggingInjector only logs each combination; an OS backend implements
    // the same KeyInjector trait.
    let (link, link_task) = DeviceLink::spawn(
        link_config,
        Arc::new(WsConnector),
        store.clone(),
        Arc::new(LoggingInjector::new()),
        notifier.clone(),
    );

    if auto_connect {
        let link = link.clone();
        tokio::spawn(async move {
            tokio::time::sleep(auto_connect_delay).await;
            if let Err(e) = link.connect().await {
                warn!("auto-connect failed: {e}");
            }
        });
    } else {
        info!("auto-connect disabled; waiting for a connect command");
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("shutdown signal received");

    link.shutdown().await.context("link session already stopped")?;
    link_task.await.context("link session task panicked")?;

    info!("padlink stopped");
    Ok(())
}
