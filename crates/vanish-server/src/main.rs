mod config;
mod console;
mod permissions;
mod plugin_manager;
mod world;

use std::path::Path;
use std::time::Duration;

use config::ServerConfig;
use console::{ConsoleOutcome, DevServer};
use permissions::PermissionStore;
use plugin_manager::PluginManager;
use tokio::io::AsyncBufReadExt;
use tracing::info;
use vanish_plugin::VanishPlugin;

#[tokio::main]
async fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "{} (vanish-server v{}) starting",
        config.server.name,
        env!("CARGO_PKG_VERSION")
    );
    info!("Max players: {}", config.server.max_players);

    let mut plugins = PluginManager::new();
    if config.plugins.vanish {
        plugins.register(Box::new(VanishPlugin::new()));
    }
    plugins.load_configs(Path::new(&config.plugins.directory));

    let permissions = PermissionStore::load(&config.permissions.file, &config.permissions.ops);
    let mut server = DevServer::new(plugins, permissions, config.server.max_players as usize);
    server.start();

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    info!("Type help for a list of commands");
    let mut tick_interval =
        tokio::time::interval(Duration::from_millis(config.server.tick_millis.max(1)));
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                server.tick();
                for line in server.take_console() {
                    println!("{line}");
                }
            }
            Some(line) = console_rx.recv() => {
                let (outcome, output) = server.handle_line(&line);
                for line in output {
                    println!("{line}");
                }
                if outcome == ConsoleOutcome::Stop {
                    break;
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    server.stop();
                    break;
                }
            }
        }
    }

    info!("Server shut down.");
}
