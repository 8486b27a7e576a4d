//! Director Bridge - Main Entry Point
//!
//! Usage: `director-bridge [settings.xml]`

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use director_bridge::api::{create_shared_state, run_server};
use director_bridge::telemetry::init_logging;
use director_bridge::{BridgeSettings, MasterApi, SceneBridge};

#[tokio::main]
async fn main() -> ExitCode {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = match BridgeSettings::load(settings_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&settings.log_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("Director Bridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(master = %settings.master_api_uri, "Using master");

    let master = match MasterApi::new(settings.master_config()) {
        Ok(master) => Arc::new(master),
        Err(e) => {
            tracing::error!("Failed to create master client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (state, commands) = create_shared_state();
    let bridge = SceneBridge::new(master, settings.scene_groups(), state.clone());
    let bridge_task = tokio::spawn(bridge.run(commands));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                // Dropping the sender would stop the server
                std::future::pending::<()>().await;
            }
        }
    });

    let served = run_server(settings.api_port, state, shutdown_rx).await;

    // The bridge holds a state handle itself, so its queue never closes here
    bridge_task.abort();
    if let Err(e) = bridge_task.await {
        if !e.is_cancelled() {
            tracing::error!("Scene bridge task failed: {}", e);
        }
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("API server failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
