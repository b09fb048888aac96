//! Plugin manager: loads, enables, and dispatches events to plugins.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use tracing::{debug, error, info, warn};
use vanish_plugin_api::{
    EventResult, LogLevel, Plugin, PluginBlockPos, PluginEvent, PluginPlayer, ServerApi,
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// A scheduled task owned by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub plugin_name: String,
    pub task_id: u32,
    pub remaining_ticks: u64,
    /// `None` = one-shot, `Some(n)` = repeating every `n` ticks.
    pub interval: Option<u64>,
}

/// Server state snapshot for plugin API reads (built before dispatch).
#[derive(Debug, Clone, Default)]
pub struct ServerSnapshot {
    pub players: Vec<PluginPlayer>,
    pub name_tags: BTreeMap<String, String>,
    /// Granted nodes per online player; `*` grants everything.
    pub permissions: BTreeMap<String, BTreeSet<String>>,
    pub current_tick: u64,
}

/// Deferred side-effect requested by a plugin during a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    SendMessage {
        player_name: String,
        message: String,
    },
    SendTip {
        player_name: String,
        message: String,
    },
    BroadcastMessage {
        message: String,
    },
    BroadcastToPermission {
        permission: String,
        message: String,
        exclude: Option<String>,
    },
    SetNameTag {
        player_name: String,
        tag: String,
    },
    SetSilent {
        player_name: String,
        silent: bool,
    },
    SetXpAttraction {
        player_name: String,
        enabled: bool,
    },
    SetFlight {
        player_name: String,
        allowed: bool,
    },
    AddEffect {
        player_name: String,
        effect_id: i32,
    },
    RemoveEffect {
        player_name: String,
        effect_id: i32,
    },
    ShowPlayer {
        viewer: String,
        target: String,
    },
    HidePlayer {
        viewer: String,
        target: String,
    },
    PlayerListAdd {
        viewer: String,
        target: String,
    },
    PlayerListRemove {
        viewer: String,
        target: String,
    },
    SetScoreTag {
        player_name: String,
        tag: String,
        value: String,
    },
    BreakBlockSilently {
        player_name: String,
        position: PluginBlockPos,
    },
    PlaceBlockSilently {
        player_name: String,
        position: PluginBlockPos,
        block_id: u32,
    },
    OpenContainerReadonly {
        player_name: String,
        position: PluginBlockPos,
    },
    SetQueryInfo {
        players: Vec<String>,
        count: u32,
    },
    RegisterCommand {
        name: String,
        description: String,
        plugin_name: String,
    },
    ScheduleTask {
        task: ScheduledTask,
    },
    CancelTask {
        plugin_name: String,
        task_id: u32,
    },
    Log {
        level: LogLevel,
        message: String,
    },
}

fn log_plugin(level: LogLevel, message: &str) {
    match level {
        LogLevel::Info => info!("[plugin] {message}"),
        LogLevel::Warn => warn!("[plugin] {message}"),
        LogLevel::Error => error!("[plugin] {message}"),
        LogLevel::Debug => debug!("[plugin] {message}"),
    }
}

// ─── ServerApiImpl ───────────────────────────────────────────────────────────

/// Implements `ServerApi` using a snapshot for reads and accumulating PendingActions for writes.
struct ServerApiImpl<'a> {
    snapshot: &'a ServerSnapshot,
    actions: Vec<PendingAction>,
}

impl<'a> ServerApiImpl<'a> {
    fn new(snapshot: &'a ServerSnapshot) -> Self {
        Self {
            snapshot,
            actions: Vec::new(),
        }
    }

    fn take_actions(self) -> Vec<PendingAction> {
        self.actions
    }

    fn push(&mut self, action: PendingAction) {
        self.actions.push(action);
    }
}

impl ServerApi for ServerApiImpl<'_> {
    fn online_players(&self) -> Vec<PluginPlayer> {
        self.snapshot.players.clone()
    }

    fn get_player(&self, name: &str) -> Option<PluginPlayer> {
        self.snapshot
            .players
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    fn has_permission(&self, name: &str, permission: &str) -> bool {
        self.snapshot
            .permissions
            .get(name)
            .is_some_and(|nodes| nodes.contains("*") || nodes.contains(permission))
    }

    fn name_tag(&self, name: &str) -> Option<String> {
        self.get_player(name)?;
        Some(
            self.snapshot
                .name_tags
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
        )
    }

    fn send_message(&mut self, player_name: &str, message: &str) {
        self.push(PendingAction::SendMessage {
            player_name: player_name.to_string(),
            message: message.to_string(),
        });
    }

    fn send_tip(&mut self, player_name: &str, message: &str) {
        self.push(PendingAction::SendTip {
            player_name: player_name.to_string(),
            message: message.to_string(),
        });
    }

    fn broadcast_message(&mut self, message: &str) {
        self.push(PendingAction::BroadcastMessage {
            message: message.to_string(),
        });
    }

    fn broadcast_to_permission(&mut self, permission: &str, message: &str, exclude: Option<&str>) {
        self.push(PendingAction::BroadcastToPermission {
            permission: permission.to_string(),
            message: message.to_string(),
            exclude: exclude.map(str::to_string),
        });
    }

    fn set_name_tag(&mut self, player_name: &str, tag: &str) {
        self.push(PendingAction::SetNameTag {
            player_name: player_name.to_string(),
            tag: tag.to_string(),
        });
    }

    fn set_silent(&mut self, player_name: &str, silent: bool) {
        self.push(PendingAction::SetSilent {
            player_name: player_name.to_string(),
            silent,
        });
    }

    fn set_xp_attraction(&mut self, player_name: &str, enabled: bool) {
        self.push(PendingAction::SetXpAttraction {
            player_name: player_name.to_string(),
            enabled,
        });
    }

    fn set_flight(&mut self, player_name: &str, allowed: bool) {
        self.push(PendingAction::SetFlight {
            player_name: player_name.to_string(),
            allowed,
        });
    }

    fn add_effect(&mut self, player_name: &str, effect_id: i32) {
        self.push(PendingAction::AddEffect {
            player_name: player_name.to_string(),
            effect_id,
        });
    }

    fn remove_effect(&mut self, player_name: &str, effect_id: i32) {
        self.push(PendingAction::RemoveEffect {
            player_name: player_name.to_string(),
            effect_id,
        });
    }

    fn show_player(&mut self, viewer: &str, target: &str) {
        self.push(PendingAction::ShowPlayer {
            viewer: viewer.to_string(),
            target: target.to_string(),
        });
    }

    fn hide_player(&mut self, viewer: &str, target: &str) {
        self.push(PendingAction::HidePlayer {
            viewer: viewer.to_string(),
            target: target.to_string(),
        });
    }

    fn player_list_add(&mut self, viewer: &str, target: &str) {
        self.push(PendingAction::PlayerListAdd {
            viewer: viewer.to_string(),
            target: target.to_string(),
        });
    }

    fn player_list_remove(&mut self, viewer: &str, target: &str) {
        self.push(PendingAction::PlayerListRemove {
            viewer: viewer.to_string(),
            target: target.to_string(),
        });
    }

    fn set_score_tag(&mut self, player_name: &str, tag: &str, value: &str) {
        self.push(PendingAction::SetScoreTag {
            player_name: player_name.to_string(),
            tag: tag.to_string(),
            value: value.to_string(),
        });
    }

    fn break_block_silently(&mut self, player_name: &str, position: PluginBlockPos) {
        self.push(PendingAction::BreakBlockSilently {
            player_name: player_name.to_string(),
            position,
        });
    }

    fn place_block_silently(&mut self, player_name: &str, position: PluginBlockPos, block_id: u32) {
        self.push(PendingAction::PlaceBlockSilently {
            player_name: player_name.to_string(),
            position,
            block_id,
        });
    }

    fn open_container_readonly(&mut self, player_name: &str, position: PluginBlockPos) {
        self.push(PendingAction::OpenContainerReadonly {
            player_name: player_name.to_string(),
            position,
        });
    }

    fn set_query_info(&mut self, players: Vec<String>, count: u32) {
        self.push(PendingAction::SetQueryInfo { players, count });
    }

    fn get_tick(&self) -> u64 {
        self.snapshot.current_tick
    }

    fn log(&self, level: LogLevel, message: &str) {
        log_plugin(level, message);
    }

    fn schedule_delayed(&mut self, plugin_name: &str, delay_ticks: u64, task_id: u32) {
        self.push(PendingAction::ScheduleTask {
            task: ScheduledTask {
                plugin_name: plugin_name.to_string(),
                task_id,
                remaining_ticks: delay_ticks,
                interval: None,
            },
        });
    }

    fn schedule_repeating(
        &mut self,
        plugin_name: &str,
        delay_ticks: u64,
        interval_ticks: u64,
        task_id: u32,
    ) {
        self.push(PendingAction::ScheduleTask {
            task: ScheduledTask {
                plugin_name: plugin_name.to_string(),
                task_id,
                remaining_ticks: delay_ticks,
                interval: Some(interval_ticks),
            },
        });
    }

    fn cancel_task(&mut self, plugin_name: &str, task_id: u32) {
        self.push(PendingAction::CancelTask {
            plugin_name: plugin_name.to_string(),
            task_id,
        });
    }

    fn register_command(&mut self, name: &str, description: &str, plugin_name: &str) {
        self.push(PendingAction::RegisterCommand {
            name: name.to_string(),
            description: description.to_string(),
            plugin_name: plugin_name.to_string(),
        });
    }
}

// ─── PluginManager ───────────────────────────────────────────────────────────

/// Manages all loaded plugins, their scheduled tasks, and command registrations.
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
    tasks: Vec<ScheduledTask>,
    /// Commands registered by plugins: command_name → plugin_name.
    pub plugin_commands: HashMap<String, String>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            tasks: Vec::new(),
            plugin_commands: HashMap::new(),
        }
    }

    /// Register a plugin (call before enable_all).
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        info!("Registered plugin: {}", plugin.info().name);
        self.plugins.push(plugin);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Enable all registered plugins. Returns the world actions they requested.
    pub fn enable_all(&mut self, snapshot: &ServerSnapshot) -> Vec<PendingAction> {
        let mut all_actions = Vec::new();
        for plugin in &mut self.plugins {
            let mut api = ServerApiImpl::new(snapshot);
            plugin.on_enable(&mut api);
            all_actions.extend(api.take_actions());
        }
        self.apply_internal_actions(all_actions)
    }

    /// Disable all registered plugins.
    pub fn disable_all(&mut self) {
        for plugin in &mut self.plugins {
            plugin.on_disable();
        }
        self.tasks.clear();
    }

    /// Dispatch an event to all plugins. Returns the combined result and pending actions.
    ///
    /// `Cancelled` stops propagation on cancellable events; `Silenced` sticks
    /// for join/quit events once any plugin asks for it.
    pub fn dispatch(
        &mut self,
        event: &PluginEvent,
        snapshot: &ServerSnapshot,
    ) -> (EventResult, Vec<PendingAction>) {
        let cancellable = event.is_cancellable();
        let silenceable = event.is_silenceable();
        let mut all_actions = Vec::new();
        let mut final_result = EventResult::Continue;

        for plugin in &mut self.plugins {
            let mut api = ServerApiImpl::new(snapshot);
            let result = plugin.on_event(event, &mut api);
            all_actions.extend(api.take_actions());

            match result {
                EventResult::Cancelled if cancellable => {
                    final_result = EventResult::Cancelled;
                    break; // Stop propagation
                }
                EventResult::Silenced if silenceable => final_result = EventResult::Silenced,
                _ => {}
            }
        }

        (final_result, self.apply_internal_actions(all_actions))
    }

    /// Tick the scheduler. Returns pending actions from fired tasks.
    pub fn tick_scheduler(&mut self, snapshot: &ServerSnapshot) -> Vec<PendingAction> {
        let mut all_actions = Vec::new();
        let mut fired: Vec<(String, u32)> = Vec::new();

        // Decrement and collect fired tasks
        for task in &mut self.tasks {
            if task.remaining_ticks > 0 {
                task.remaining_ticks -= 1;
            }
            if task.remaining_ticks == 0 {
                fired.push((task.plugin_name.clone(), task.task_id));
                if let Some(interval) = task.interval {
                    task.remaining_ticks = interval;
                }
            }
        }

        // Remove one-shot tasks that fired
        self.tasks
            .retain(|t| t.remaining_ticks > 0 || t.interval.is_some());

        for (plugin_name, task_id) in fired {
            if let Some(plugin) = self
                .plugins
                .iter_mut()
                .find(|p| p.info().name == plugin_name)
            {
                let mut api = ServerApiImpl::new(snapshot);
                plugin.on_task(task_id, &mut api);
                all_actions.extend(api.take_actions());
            }
        }

        self.apply_internal_actions(all_actions)
    }

    /// Handle a plugin-registered command. Returns (response_message, pending_actions),
    /// or `None` if no plugin owns the command.
    pub fn handle_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        snapshot: &ServerSnapshot,
    ) -> Option<(Option<String>, Vec<PendingAction>)> {
        let plugin_name = self.plugin_commands.get(command)?.clone();
        let plugin = self
            .plugins
            .iter_mut()
            .find(|p| p.info().name == plugin_name)?;

        let mut api = ServerApiImpl::new(snapshot);
        let response = plugin.on_command(command, args, sender, &mut api);
        let actions = api.take_actions();
        Some((response, self.apply_internal_actions(actions)))
    }

    /// Resolve `%identifier_params%` against every plugin until one answers.
    pub fn resolve_placeholder(
        &mut self,
        identifier: &str,
        params: &str,
        player: Option<&str>,
        snapshot: &ServerSnapshot,
    ) -> Option<String> {
        let api = ServerApiImpl::new(snapshot);
        self.plugins
            .iter_mut()
            .find_map(|p| p.on_placeholder(identifier, params, player, &api))
    }

    /// Load configs for all plugins from `<dir>/<name>/config.json`, writing
    /// the default config where none exists.
    pub fn load_configs(&mut self, dir: &Path) {
        for plugin in &mut self.plugins {
            let info = plugin.info();
            if let Some(default_config) = plugin.default_config() {
                let plugin_dir = dir.join(&info.name);
                let config_path = plugin_dir.join("config.json");

                let config = if config_path.exists() {
                    match std::fs::read_to_string(&config_path) {
                        Ok(data) => match serde_json::from_str(&data) {
                            Ok(v) => v,
                            Err(e) => {
                                warn!("Failed to parse config for {}: {e}", info.name);
                                default_config.clone()
                            }
                        },
                        Err(e) => {
                            warn!("Failed to read config for {}: {e}", info.name);
                            default_config.clone()
                        }
                    }
                } else {
                    // Write default config
                    std::fs::create_dir_all(&plugin_dir).ok();
                    if let Ok(json) = serde_json::to_string_pretty(&default_config) {
                        std::fs::write(&config_path, json).ok();
                    }
                    default_config
                };

                plugin.load_config(config);
            }
        }
    }

    /// Apply internal actions (RegisterCommand, ScheduleTask, CancelTask, Log)
    /// immediately and hand the rest back for the world.
    fn apply_internal_actions(&mut self, actions: Vec<PendingAction>) -> Vec<PendingAction> {
        let mut world_actions = Vec::new();
        for action in actions {
            match action {
                PendingAction::RegisterCommand {
                    name, plugin_name, ..
                } => {
                    self.plugin_commands.insert(name, plugin_name);
                }
                PendingAction::ScheduleTask { task } => {
                    self.tasks.push(task);
                }
                PendingAction::CancelTask {
                    plugin_name,
                    task_id,
                } => {
                    self.tasks
                        .retain(|t| !(t.plugin_name == plugin_name && t.task_id == task_id));
                }
                PendingAction::Log { level, message } => log_plugin(level, &message),
                other => world_actions.push(other),
            }
        }
        world_actions
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
