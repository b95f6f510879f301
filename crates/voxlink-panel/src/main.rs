//! Voxlink panel binary - composition root.
//!
//! Ties the Voxlink crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the settings and history stores
//! 3. Spawn the bridge task (engine process + reconnect loop)
//! 4. Run the panel event loop against a line-oriented terminal frontend
//!
//! The terminal frontend is intentionally minimal: the panel core is the
//! same one a graphical frontend would drive through [`panel::Panel`].

mod cli;
mod events;
mod hosts;
mod panel;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, Notify};

use voxlink_bridge::{Connection, EngineProcessConnector, ReconnectPolicy};
use voxlink_core::config::PanelConfig;
use voxlink_inject::{InjectionResolver, SystemClipboard};
use voxlink_store::{HistoryStore, SettingsStore};

use cli::CliArgs;
use events::PanelEvent;
use hosts::{HeadlessPageHost, HeadlessTabHost};
use panel::Panel;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn print_event(event: &PanelEvent) {
    match event {
        PanelEvent::ConnectionChanged(state) => println!("[bridge] {}", state),
        PanelEvent::SessionChanged(state) => println!("[session] {}", state),
        PanelEvent::PartialPreview(text) => println!("[preview] {}", text),
        PanelEvent::Transcript(text) => println!("[transcript] {}", text),
        PanelEvent::Toast(message) => println!("[notice] {}", message),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = PanelConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Voxlink v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Stores.
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| resolve_data_dir(&config.general.data_dir));
    std::fs::create_dir_all(&data_dir)?;
    let settings = SettingsStore::open(data_dir.join("settings.json"))?;
    let history = HistoryStore::open(data_dir.join("history.json"))?;
    tracing::info!(path = %data_dir.display(), "Stores opened");

    // Bridge task.
    let engine_command = args
        .engine
        .clone()
        .unwrap_or_else(|| config.engine.command.clone());
    let connector = EngineProcessConnector::new(engine_command, config.engine.args.clone());
    let policy = ReconnectPolicy {
        max_attempts: config.bridge.max_attempts,
        base_delay: Duration::from_millis(config.bridge.base_delay_ms),
    };
    let connection = Connection::new(Box::new(connector), policy);

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (bridge_tx, mut bridge_rx) = mpsc::channel(64);
    let shutdown = Arc::new(Notify::new());
    let bridge_shutdown = Arc::clone(&shutdown);
    let bridge_task = tokio::spawn(async move {
        voxlink_bridge::run(connection, cmd_rx, bridge_tx, bridge_shutdown).await;
    });

    // Panel core with terminal-only hosts: local/AI delivery degrades to
    // the clipboard until a page-scripting host is attached.
    let resolver = InjectionResolver::new(
        Arc::new(HeadlessPageHost),
        Arc::new(HeadlessTabHost),
        Arc::new(SystemClipboard),
    );
    let mut panel = Panel::new(settings, history, resolver, cmd_tx);

    let mut panel_events = panel.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = panel_events.recv().await {
            print_event(&event);
        }
    });

    println!("Commands: toggle | model <name> | paste | send <provider> | history | quit");

    // Single event loop: bridge events and terminal commands, one at a time.
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = bridge_rx.recv() => {
                match event {
                    Some(event) => panel.on_bridge_event(event).await,
                    None => {
                        tracing::info!("Bridge task ended");
                        break;
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b.trim())) {
                    ("toggle", _) | ("t", _) => panel.toggle_recording().await,
                    ("model", name) if !name.is_empty() => {
                        panel.set_model(name.to_string()).await
                    }
                    ("paste", _) => panel.paste_last().await,
                    ("send", provider) if !provider.is_empty() => {
                        panel.send_last_to(provider).await
                    }
                    ("history", _) => {
                        for entry in panel.history().entries() {
                            println!("{}  {}", entry.timestamp.format("%H:%M:%S"), entry.text);
                        }
                    }
                    ("quit", _) | ("q", _) => break,
                    ("", _) => {}
                    (other, _) => println!("Unknown command: {}", other),
                }
            }
        }
    }

    shutdown.notify_waiters();
    let _ = bridge_task.await;
    tracing::info!("Voxlink stopped");
    Ok(())
}
