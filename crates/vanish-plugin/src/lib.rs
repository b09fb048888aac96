//! The vanish plugin: wires the vanish core into the plugin host.
//!
//! Event guards live in [`listeners`], text commands in [`commands`]. The
//! reconciliation sweep runs as a repeating scheduler task.

pub mod bridge;
pub mod commands;
pub mod hud;
mod listeners;
pub mod placeholders;

#[cfg(test)]
mod testing;

use tracing::{info, warn};
use vanish_core::{
    Clock, JsonFileStore, PersistenceStore, SystemClock, VanishConfig, VanishManager,
};
use vanish_plugin_api::{
    EventResult, LogLevel, Plugin, PluginEvent, PluginInfo, ServerApi,
};

use crate::bridge::HostBridge;
use crate::listeners::SilentPositions;

pub const PLUGIN_NAME: &str = "Vanish";

/// Repeating reconciliation sweep.
pub const SWEEP_TASK: u32 = 1;
/// One-shot HUD refresh scheduled after a quit.
pub const HUD_REFRESH_TASK: u32 = 2;
pub(crate) const HUD_REFRESH_DELAY: u64 = 20;

type Backend = (Box<dyn PersistenceStore>, Box<dyn Clock>);

pub struct VanishPlugin {
    config: VanishConfig,
    manager: Option<VanishManager>,
    /// Store and clock handed to the manager on enable. Falls back to JSON
    /// files in `data_dir` and the system clock.
    backend: Option<Backend>,
    silent_positions: SilentPositions,
}

impl VanishPlugin {
    pub fn new() -> Self {
        Self {
            config: VanishConfig::default(),
            manager: None,
            backend: None,
            silent_positions: SilentPositions::default(),
        }
    }

    pub fn with_backend(store: Box<dyn PersistenceStore>, clock: Box<dyn Clock>) -> Self {
        Self {
            backend: Some((store, clock)),
            ..Self::new()
        }
    }

    pub fn config(&self) -> &VanishConfig {
        &self.config
    }

    /// `None` until the plugin is enabled.
    pub fn manager(&self) -> Option<&VanishManager> {
        self.manager.as_ref()
    }

    fn sweep(&mut self, api: &mut dyn ServerApi) {
        self.silent_positions.purge(api.get_tick());
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        let report = manager.reconcile(&mut HostBridge::new(api));
        for error in manager.take_persistence_errors() {
            api.log(LogLevel::Error, &format!("Vanish data not saved: {error}"));
        }
        if report.changed() {
            hud::refresh(manager, api);
        }
    }
}

impl Default for VanishPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for VanishPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: PLUGIN_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "Hide players from each other with modes and groups".into(),
            author: "vanish".into(),
        }
    }

    fn on_enable(&mut self, api: &mut dyn ServerApi) {
        let (store, clock): Backend = match self.backend.take() {
            Some(backend) => backend,
            None => (
                Box::new(JsonFileStore::new(&self.config.data_dir)),
                Box::new(SystemClock),
            ),
        };
        let manager = VanishManager::new(self.config.clone(), store, clock);
        info!(
            "Vanish enabled: {} modes, {} groups, {} vanished",
            manager.registry().modes().count(),
            manager.registry().groups().count(),
            manager.vanished_players().len()
        );
        self.manager = Some(manager);

        for (name, description) in commands::COMMANDS {
            api.register_command(name, description, PLUGIN_NAME);
        }
        let interval = self.config.task.interval_ticks.max(1);
        api.schedule_repeating(PLUGIN_NAME, interval, interval, SWEEP_TASK);
    }

    fn on_disable(&mut self) {
        if let Some(mut manager) = self.manager.take() {
            if let Err(e) = manager.shutdown() {
                warn!("Failed to save vanish data on shutdown: {e}");
            }
        }
    }

    fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
        self.handle_event(event, api)
    }

    fn on_task(&mut self, task_id: u32, api: &mut dyn ServerApi) {
        match task_id {
            SWEEP_TASK => self.sweep(api),
            HUD_REFRESH_TASK => {
                if let Some(manager) = &self.manager {
                    hud::refresh(manager, api);
                }
            }
            _ => {}
        }
    }

    fn on_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        api: &mut dyn ServerApi,
    ) -> Option<String> {
        let manager = self.manager.as_mut()?;
        let reply = commands::execute(manager, command, args, sender, api);
        hud::refresh(manager, api);
        reply
    }

    fn on_placeholder(
        &mut self,
        identifier: &str,
        params: &str,
        player: Option<&str>,
        _api: &dyn ServerApi,
    ) -> Option<String> {
        if identifier != placeholders::IDENTIFIER {
            return None;
        }
        placeholders::resolve(self.manager.as_ref()?, params, player)
    }

    fn default_config(&self) -> Option<serde_json::Value> {
        Some(VanishConfig::default().to_json())
    }

    fn load_config(&mut self, config: serde_json::Value) {
        match VanishConfig::from_json(config) {
            Ok(config) => self.config = config,
            Err(e) => warn!("Invalid vanish config, using defaults: {e}"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
