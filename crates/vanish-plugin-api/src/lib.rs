//! Plugin API: traits, events, and server API for plugin authors.
//!
//! A game host implements [`ServerApi`] and dispatches [`PluginEvent`]s to
//! each registered [`Plugin`]. This crate knows nothing about vanish.

// ─── Types ───────────────────────────────────────────────────────────────────

/// Sender name used when the server console runs a command.
pub const CONSOLE_SENDER: &str = "CONSOLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "0" | "s" | "survival" => Some(GameMode::Survival),
            "1" | "c" | "creative" => Some(GameMode::Creative),
            "2" | "a" | "adventure" => Some(GameMode::Adventure),
            "3" | "sp" | "spectator" => Some(GameMode::Spectator),
            _ => None,
        }
    }
}

/// Information about an online player, passed to plugins in events.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginPlayer {
    pub name: String,
    pub uuid: String,
    pub gamemode: GameMode,
    /// False while the client is still loading into the world.
    pub spawned: bool,
}

impl PluginPlayer {
    pub fn is_survival(&self) -> bool {
        self.gamemode == GameMode::Survival
    }
}

/// Block position for plugin events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginBlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl PluginBlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Cause of damage for PlayerDamage events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageCause {
    Attack,
    Projectile,
    Fall,
    Drowning,
    Lava,
    Fire,
    Suffocation,
    Starvation,
    Void,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    LeftClickBlock,
    RightClickBlock,
}

/// Status effect ids understood by [`ServerApi::add_effect`].
pub mod effect {
    pub const NIGHT_VISION: i32 = 16;
}

/// Log level for plugin logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

/// Result of dispatching an event to a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue normal handling.
    Continue,
    /// Event was cancelled by this plugin.
    Cancelled,
    /// Let the event happen but suppress its broadcast (join/quit message).
    Silenced,
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// All events that plugins can listen to.
#[derive(Debug, Clone)]
pub enum PluginEvent {
    // --- Player events ---
    PlayerJoin {
        player: PluginPlayer,
    },
    PlayerQuit {
        player: PluginPlayer,
    },
    PlayerCommand {
        player: PluginPlayer,
        command: String,
        args: Vec<String>,
    },
    PlayerDamage {
        player: PluginPlayer,
        damage: f32,
        cause: DamageCause,
        /// Set when another player dealt the damage.
        attacker: Option<PluginPlayer>,
    },
    PlayerCombust {
        player: PluginPlayer,
    },
    PlayerExhaust {
        player: PluginPlayer,
        amount: f32,
    },
    ItemPickup {
        player: PluginPlayer,
        item_id: u32,
    },
    PlayerInteract {
        player: PluginPlayer,
        position: PluginBlockPos,
        action: InteractAction,
        /// The clicked block is a container (chest, barrel, ...).
        container: bool,
        sneaking: bool,
        /// Ticks the block takes to break, for left clicks.
        break_ticks: u64,
    },

    // --- Block events ---
    BlockBreak {
        player: PluginPlayer,
        position: PluginBlockPos,
        block_id: u32,
    },
    BlockPlace {
        player: PluginPlayer,
        position: PluginBlockPos,
        block_id: u32,
    },

    // --- World events ---
    WorldSound {
        position: PluginBlockPos,
    },

    // --- Server events ---
    /// The query response is being rebuilt. Plugins adjust it with
    /// [`ServerApi::set_query_info`].
    QueryRegenerate {
        players: Vec<String>,
        count: u32,
    },
    ServerStarted,
    ServerStopping,
}

impl PluginEvent {
    /// Whether this event type can be cancelled by a plugin.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            PluginEvent::PlayerCommand { .. }
                | PluginEvent::PlayerDamage { .. }
                | PluginEvent::PlayerCombust { .. }
                | PluginEvent::PlayerExhaust { .. }
                | PluginEvent::ItemPickup { .. }
                | PluginEvent::PlayerInteract { .. }
                | PluginEvent::BlockBreak { .. }
                | PluginEvent::BlockPlace { .. }
                | PluginEvent::WorldSound { .. }
        )
    }

    /// Whether the event's broadcast can be suppressed with `Silenced`.
    pub fn is_silenceable(&self) -> bool {
        matches!(
            self,
            PluginEvent::PlayerJoin { .. } | PluginEvent::PlayerQuit { .. }
        )
    }
}

// ─── Plugin trait ────────────────────────────────────────────────────────────

/// Metadata about a plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
}

pub trait Plugin: Send {
    /// Return plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Called when the plugin is loaded. Use `api` to register commands, schedule tasks.
    fn on_enable(&mut self, api: &mut dyn ServerApi);

    /// Called when the plugin is unloaded.
    fn on_disable(&mut self) {}

    /// Called for every dispatched event. Return `Cancelled` to cancel cancellable events.
    fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
        let _ = (event, api);
        EventResult::Continue
    }

    /// Called when a scheduled task fires.
    fn on_task(&mut self, task_id: u32, api: &mut dyn ServerApi) {
        let _ = (task_id, api);
    }

    /// Called when a plugin-registered command is executed. Return a response message.
    fn on_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        api: &mut dyn ServerApi,
    ) -> Option<String> {
        let _ = (command, args, sender, api);
        None
    }

    /// Resolve `%identifier_params%` style placeholders for scoreboards and chat.
    fn on_placeholder(
        &mut self,
        identifier: &str,
        params: &str,
        player: Option<&str>,
        api: &dyn ServerApi,
    ) -> Option<String> {
        let _ = (identifier, params, player, api);
        None
    }

    /// Return a default config as JSON. If `Some`, the plugin gets a config file.
    fn default_config(&self) -> Option<serde_json::Value> {
        None
    }

    /// Called with the loaded config (from `plugins/<name>/config.json`).
    fn load_config(&mut self, _config: serde_json::Value) {}
}

// ─── Server API ──────────────────────────────────────────────────────────────

/// Safe read/write access to server state, passed to plugins during callbacks.
///
/// Read methods return data immediately. Write methods are deferred (applied
/// after the plugin callback returns).
pub trait ServerApi {
    // --- Players ---
    fn online_players(&self) -> Vec<PluginPlayer>;
    fn get_player(&self, name: &str) -> Option<PluginPlayer>;
    fn has_permission(&self, name: &str, permission: &str) -> bool;
    fn name_tag(&self, name: &str) -> Option<String>;

    /// Case-insensitive prefix lookup; an exact name wins, otherwise the
    /// shortest matching name.
    fn find_player(&self, prefix: &str) -> Option<PluginPlayer> {
        let needle = prefix.to_lowercase();
        let mut best: Option<PluginPlayer> = None;
        for p in self.online_players() {
            let lower = p.name.to_lowercase();
            if lower == needle {
                return Some(p);
            }
            if lower.starts_with(&needle) && best.as_ref().map_or(true, |b| p.name.len() < b.name.len())
            {
                best = Some(p);
            }
        }
        best
    }

    // --- Messaging ---
    fn send_message(&mut self, player_name: &str, message: &str);
    fn send_tip(&mut self, player_name: &str, message: &str);
    fn broadcast_message(&mut self, message: &str);
    fn broadcast_to_permission(&mut self, permission: &str, message: &str, exclude: Option<&str>);

    // --- Presentation ---
    fn set_name_tag(&mut self, player_name: &str, tag: &str);
    fn set_silent(&mut self, player_name: &str, silent: bool);
    fn set_xp_attraction(&mut self, player_name: &str, enabled: bool);
    fn set_flight(&mut self, player_name: &str, allowed: bool);
    fn add_effect(&mut self, player_name: &str, effect_id: i32);
    fn remove_effect(&mut self, player_name: &str, effect_id: i32);
    fn show_player(&mut self, viewer: &str, target: &str);
    fn hide_player(&mut self, viewer: &str, target: &str);
    fn player_list_add(&mut self, viewer: &str, target: &str);
    fn player_list_remove(&mut self, viewer: &str, target: &str);
    fn set_score_tag(&mut self, player_name: &str, tag: &str, value: &str);

    // --- World ---
    fn break_block_silently(&mut self, player_name: &str, position: PluginBlockPos);
    fn place_block_silently(&mut self, player_name: &str, position: PluginBlockPos, block_id: u32);
    /// Show a container's contents without playing its open animation.
    fn open_container_readonly(&mut self, player_name: &str, position: PluginBlockPos);
    fn set_query_info(&mut self, players: Vec<String>, count: u32);

    // --- Server ---
    fn get_tick(&self) -> u64;
    fn log(&self, level: LogLevel, message: &str);

    // --- Scheduler ---
    fn schedule_delayed(&mut self, plugin_name: &str, delay_ticks: u64, task_id: u32);
    fn schedule_repeating(
        &mut self,
        plugin_name: &str,
        delay_ticks: u64,
        interval_ticks: u64,
        task_id: u32,
    );
    fn cancel_task(&mut self, plugin_name: &str, task_id: u32);

    // --- Commands ---
    fn register_command(&mut self, name: &str, description: &str, plugin_name: &str);
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> PluginPlayer {
        PluginPlayer {
            name: name.into(),
            uuid: "00000000-0000-0000-0000-000000000001".into(),
            gamemode: GameMode::Survival,
            spawned: true,
        }
    }

    // Minimal ServerApi implementation for testing.
    struct MockApi {
        players: Vec<PluginPlayer>,
        messages: Vec<(String, String)>,
        commands: Vec<(String, String)>,
    }

    impl MockApi {
        fn new(names: &[&str]) -> Self {
            Self {
                players: names.iter().map(|n| player(n)).collect(),
                messages: Vec::new(),
                commands: Vec::new(),
            }
        }
    }

    impl ServerApi for MockApi {
        fn online_players(&self) -> Vec<PluginPlayer> {
            self.players.clone()
        }
        fn get_player(&self, name: &str) -> Option<PluginPlayer> {
            self.players.iter().find(|p| p.name == name).cloned()
        }
        fn has_permission(&self, _name: &str, _permission: &str) -> bool {
            false
        }
        fn name_tag(&self, name: &str) -> Option<String> {
            self.get_player(name).map(|p| p.name)
        }
        fn send_message(&mut self, player_name: &str, message: &str) {
            self.messages
                .push((player_name.to_string(), message.to_string()));
        }
        fn send_tip(&mut self, _player_name: &str, _message: &str) {}
        fn broadcast_message(&mut self, _message: &str) {}
        fn broadcast_to_permission(&mut self, _p: &str, _m: &str, _exclude: Option<&str>) {}
        fn set_name_tag(&mut self, _player_name: &str, _tag: &str) {}
        fn set_silent(&mut self, _player_name: &str, _silent: bool) {}
        fn set_xp_attraction(&mut self, _player_name: &str, _enabled: bool) {}
        fn set_flight(&mut self, _player_name: &str, _allowed: bool) {}
        fn add_effect(&mut self, _player_name: &str, _effect_id: i32) {}
        fn remove_effect(&mut self, _player_name: &str, _effect_id: i32) {}
        fn show_player(&mut self, _viewer: &str, _target: &str) {}
        fn hide_player(&mut self, _viewer: &str, _target: &str) {}
        fn player_list_add(&mut self, _viewer: &str, _target: &str) {}
        fn player_list_remove(&mut self, _viewer: &str, _target: &str) {}
        fn set_score_tag(&mut self, _player_name: &str, _tag: &str, _value: &str) {}
        fn break_block_silently(&mut self, _player_name: &str, _position: PluginBlockPos) {}
        fn place_block_silently(&mut self, _p: &str, _position: PluginBlockPos, _id: u32) {}
        fn open_container_readonly(&mut self, _player_name: &str, _position: PluginBlockPos) {}
        fn set_query_info(&mut self, _players: Vec<String>, _count: u32) {}
        fn get_tick(&self) -> u64 {
            100
        }
        fn log(&self, _level: LogLevel, _message: &str) {}
        fn schedule_delayed(&mut self, _plugin_name: &str, _delay_ticks: u64, _task_id: u32) {}
        fn schedule_repeating(
            &mut self,
            _plugin_name: &str,
            _delay_ticks: u64,
            _interval_ticks: u64,
            _task_id: u32,
        ) {
        }
        fn cancel_task(&mut self, _plugin_name: &str, _task_id: u32) {}
        fn register_command(&mut self, name: &str, description: &str, _plugin_name: &str) {
            self.commands
                .push((name.to_string(), description.to_string()));
        }
    }

    // Cancels damage to anyone named "Ghost" and hides their quit message.
    struct GhostPlugin;

    impl Plugin for GhostPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                name: "GhostPlugin".into(),
                version: "1.0.0".into(),
                description: "Test plugin".into(),
                author: "Test".into(),
            }
        }

        fn on_enable(&mut self, api: &mut dyn ServerApi) {
            api.register_command("boo", "Scare a player", "GhostPlugin");
        }

        fn on_event(&mut self, event: &PluginEvent, _api: &mut dyn ServerApi) -> EventResult {
            match event {
                PluginEvent::PlayerDamage { player, .. } if player.name == "Ghost" => {
                    EventResult::Cancelled
                }
                PluginEvent::PlayerQuit { player } if player.name == "Ghost" => {
                    EventResult::Silenced
                }
                _ => EventResult::Continue,
            }
        }

        fn on_command(
            &mut self,
            command: &str,
            args: &[String],
            sender: &str,
            api: &mut dyn ServerApi,
        ) -> Option<String> {
            if command != "boo" {
                return None;
            }
            let target = args
                .first()
                .and_then(|a| api.find_player(a))
                .map(|p| p.name)
                .unwrap_or_else(|| sender.to_string());
            api.send_message(&target, "Boo!");
            Some(format!("Scared {target}"))
        }

        fn on_placeholder(
            &mut self,
            identifier: &str,
            params: &str,
            _player: Option<&str>,
            api: &dyn ServerApi,
        ) -> Option<String> {
            (identifier == "ghost" && params == "count").then(|| api.online_players().len().to_string())
        }
    }

    #[test]
    fn enable_registers_command() {
        let mut plugin = GhostPlugin;
        let mut api = MockApi::new(&[]);
        plugin.on_enable(&mut api);
        assert_eq!(api.commands[0].0, "boo");
    }

    #[test]
    fn results_per_event() {
        let mut plugin = GhostPlugin;
        let mut api = MockApi::new(&["Ghost"]);
        let damage = PluginEvent::PlayerDamage {
            player: player("Ghost"),
            damage: 2.0,
            cause: DamageCause::Fall,
            attacker: None,
        };
        assert_eq!(plugin.on_event(&damage, &mut api), EventResult::Cancelled);
        let quit = PluginEvent::PlayerQuit {
            player: player("Ghost"),
        };
        assert_eq!(plugin.on_event(&quit, &mut api), EventResult::Silenced);
        let join = PluginEvent::PlayerJoin {
            player: player("Steve"),
        };
        assert_eq!(plugin.on_event(&join, &mut api), EventResult::Continue);
    }

    #[test]
    fn command_uses_prefix_lookup() {
        let mut plugin = GhostPlugin;
        let mut api = MockApi::new(&["Steve", "Stephanie", "Bob"]);
        let response = plugin.on_command("boo", &["ste".into()], "Bob", &mut api);
        assert_eq!(response, Some("Scared Steve".into()));
        assert_eq!(api.messages[0].0, "Steve");
    }

    #[test]
    fn find_player_prefers_exact_then_shortest() {
        let api = MockApi::new(&["Stephanie", "Steve", "steven"]);
        assert_eq!(api.find_player("STEVE").unwrap().name, "Steve");
        assert_eq!(api.find_player("step").unwrap().name, "Stephanie");
        assert!(api.find_player("x").is_none());
    }

    #[test]
    fn placeholder_resolves() {
        let mut plugin = GhostPlugin;
        let api = MockApi::new(&["A", "B"]);
        assert_eq!(plugin.on_placeholder("ghost", "count", None, &api), Some("2".into()));
        assert_eq!(plugin.on_placeholder("other", "count", None, &api), None);
    }

    #[test]
    fn gamemode_parsing() {
        assert_eq!(GameMode::parse("Creative"), Some(GameMode::Creative));
        assert_eq!(GameMode::parse("sp"), Some(GameMode::Spectator));
        assert_eq!(GameMode::parse("0"), Some(GameMode::Survival));
        assert_eq!(GameMode::parse("hardcore"), None);
        assert!(player("x").is_survival());
    }

    #[test]
    fn event_flags() {
        let pos = PluginBlockPos::new(0, 64, 0);
        assert!(PluginEvent::BlockBreak {
            player: player("a"),
            position: pos,
            block_id: 1,
        }
        .is_cancellable());
        assert!(PluginEvent::WorldSound { position: pos }.is_cancellable());
        assert!(!PluginEvent::PlayerJoin { player: player("a") }.is_cancellable());
        assert!(PluginEvent::PlayerJoin { player: player("a") }.is_silenceable());
        assert!(!PluginEvent::QueryRegenerate {
            players: Vec::new(),
            count: 0
        }
        .is_cancellable());
        assert!(!PluginEvent::ServerStopping.is_silenceable());
    }
}
