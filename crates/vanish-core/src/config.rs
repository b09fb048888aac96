//! Plugin configuration.
//!
//! Every field has a default so a partial (or empty) config file still
//! yields a usable [`VanishConfig`]. The shipped defaults mirror what a fresh
//! install writes to `config.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::settings::SettingsBag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VanishConfig {
    /// Directory holding the vanished list, player settings, stats and logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_id")]
    pub default_mode: String,
    #[serde(default = "default_id")]
    pub default_group: String,
    #[serde(default)]
    pub settings: SettingsSection,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub silent_join_leave: SilentJoinLeave,
    /// Extra targeted commands (first argument is a player name) that must
    /// not reveal vanished receivers, keyed by lowercase command name.
    #[serde(default)]
    pub additional_commands: BTreeMap<String, AdditionalCommand>,
    #[serde(default = "default_modes")]
    pub modes: BTreeMap<String, ModeConfig>,
    #[serde(default = "default_groups")]
    pub groups: BTreeMap<String, GroupConfig>,
    #[serde(default)]
    pub stats: StatsSection,
    #[serde(default)]
    pub task: TaskSection,
}

impl Default for VanishConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_mode: default_id(),
            default_group: default_id(),
            settings: SettingsSection::default(),
            messages: Messages::default(),
            silent_join_leave: SilentJoinLeave::default(),
            additional_commands: BTreeMap::new(),
            modes: default_modes(),
            groups: default_groups(),
            stats: StatsSection::default(),
            task: TaskSection::default(),
        }
    }
}

impl VanishConfig {
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Global feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSection {
    /// Broadcast a fake "left the game" message on vanish.
    #[serde(default)]
    pub enable_leave: bool,
    /// Broadcast a fake "joined the game" message on unvanish.
    #[serde(default)]
    pub enable_join: bool,
    #[serde(default)]
    pub unvanish_after_leaving: bool,
    #[serde(default)]
    pub unvanish_after_restart: bool,
    #[serde(default = "default_true")]
    pub enable_fly: bool,
    #[serde(default = "default_true")]
    pub disable_damage: bool,
    #[serde(default = "default_true")]
    pub silent_chest: bool,
    #[serde(default)]
    pub hunger: bool,
    #[serde(default = "default_true")]
    pub night_vision: bool,
    #[serde(default)]
    pub can_send_msg: bool,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            enable_leave: false,
            enable_join: false,
            unvanish_after_leaving: false,
            unvanish_after_restart: false,
            enable_fly: true,
            disable_damage: true,
            silent_chest: true,
            hunger: false,
            night_vision: true,
            can_send_msg: false,
        }
    }
}

impl SettingsSection {
    /// Look up a global flag by the key modes use to override it.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "fly" | "enable_fly" => Some(self.enable_fly),
            "disable_damage" => Some(self.disable_damage),
            "silent_chest" => Some(self.silent_chest),
            "hunger" => Some(self.hunger),
            "night_vision" => Some(self.night_vision),
            "can_send_msg" => Some(self.can_send_msg),
            "enable_leave" => Some(self.enable_leave),
            "enable_join" => Some(self.enable_join),
            _ => None,
        }
    }
}

/// Message templates. `%name`, `%other-name`, `%sender` and `%message` are
/// substituted where the template is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub prefix: String,
    pub vanish: String,
    pub unvanish: String,
    pub vanish_other: String,
    pub unvanish_other: String,
    pub vanished_other: String,
    pub unvanished_other: String,
    pub hit_no_permission: String,
    pub hud_message: String,
    pub fake_leave: String,
    pub fake_join: String,
    pub vanish_notify: String,
    pub unvanish_notify: String,
    pub player_not_found: String,
    pub no_permission: String,
    pub no_permission_other: String,
    pub in_game_only: String,
    pub sender_error: String,
    pub receiver_message: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            prefix: "§9Vanish §8» §r".into(),
            vanish: "§aYou are now vanished.".into(),
            unvanish: "§cYou are no longer vanished!".into(),
            vanish_other: "§aVanished %name".into(),
            unvanish_other: "§cUnvanished %name".into(),
            vanished_other: "§aYou were vanished by %other-name.".into(),
            unvanished_other: "§cYou were unvanished by %other-name.".into(),
            hit_no_permission: "§cYou do not have permission to hit other players while vanished"
                .into(),
            hud_message: "§aYou are currently vanished".into(),
            fake_leave: "§e%name left the game".into(),
            fake_join: "§e%name joined the game".into(),
            vanish_notify: "§7§o[%name: Vanished]".into(),
            unvanish_notify: "§7§o[%name: Unvanished]".into(),
            player_not_found: "§cPlayer not found".into(),
            no_permission: "§cYou do not have permission to use this command".into(),
            no_permission_other: "§cYou do not have permission to vanish other players".into(),
            in_game_only: "§cUse this command In-Game".into(),
            sender_error: "§cPlayer not found".into(),
            receiver_message: "§7%sender tried to message you: %message".into(),
        }
    }
}

/// Replace each `(placeholder, value)` pair in `template`.
pub fn format_message(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (placeholder, value) in replacements {
        out = out.replace(placeholder, value);
    }
    out
}

/// Suppression of the real join/quit broadcasts for `vanish.silent` holders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilentJoinLeave {
    #[serde(default = "default_true")]
    pub join: bool,
    #[serde(default = "default_true")]
    pub leave: bool,
    /// Only silence players who are vanished at the time.
    #[serde(default = "default_true")]
    pub vanished_only: bool,
}

impl Default for SilentJoinLeave {
    fn default() -> Self {
        Self {
            join: true,
            leave: true,
            vanished_only: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdditionalCommand {
    #[serde(default)]
    pub sender_error: String,
    /// `%sender` is replaced with the sender's name.
    #[serde(default)]
    pub receiver_message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(default)]
    pub settings: SettingsBag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(default)]
    pub visible_to: Vec<String>,
    #[serde(default)]
    pub settings: SettingsBag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSection {
    #[serde(default = "default_max_logs")]
    pub max_logs: usize,
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            max_logs: default_max_logs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSection {
    /// Ticks between reconciliation sweeps.
    #[serde(default = "default_interval_ticks")]
    pub interval_ticks: u64,
}

impl Default for TaskSection {
    fn default() -> Self {
        Self {
            interval_ticks: default_interval_ticks(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> String {
    "plugins/Vanish".to_string()
}

fn default_id() -> String {
    "default".to_string()
}

fn default_max_logs() -> usize {
    1000
}

fn default_interval_ticks() -> u64 {
    20
}

fn mode(name: &str, description: &str, settings: SettingsBag) -> ModeConfig {
    ModeConfig {
        name: Some(name.to_string()),
        description: description.to_string(),
        permission: None,
        settings,
    }
}

fn base_mode_settings() -> SettingsBag {
    SettingsBag::new()
        .with("fly", true)
        .with("night_vision", true)
        .with("disable_damage", true)
        .with("silent_chest", true)
        .with("hunger", false)
}

fn default_modes() -> BTreeMap<String, ModeConfig> {
    let mut modes = BTreeMap::new();
    modes.insert(
        "default".to_string(),
        mode("Default", "Standard vanish mode", base_mode_settings()),
    );
    modes.insert(
        "staff".to_string(),
        mode(
            "Staff",
            "Staff vanish mode with special features",
            base_mode_settings()
                .with("staff_chat", true)
                .with("see_reports", true),
        ),
    );
    modes.insert(
        "spectator".to_string(),
        mode(
            "Spectator",
            "Spectator mode with no interaction",
            base_mode_settings()
                .with("no_interact", true)
                .with("no_place", true)
                .with("no_break", true),
        ),
    );
    modes
}

fn group(name: &str, description: &str, visible_to: &[&str]) -> GroupConfig {
    GroupConfig {
        name: Some(name.to_string()),
        description: description.to_string(),
        permission: None,
        visible_to: visible_to.iter().map(|s| s.to_string()).collect(),
        settings: SettingsBag::new(),
    }
}

fn default_groups() -> BTreeMap<String, GroupConfig> {
    let mut groups = BTreeMap::new();
    groups.insert(
        "default".to_string(),
        group(
            "Default",
            "Standard vanish group",
            &["default", "admin", "mod"],
        ),
    );
    groups.insert(
        "admin".to_string(),
        group("Admin", "Admin vanish group", &["admin"]),
    );
    groups.insert(
        "mod".to_string(),
        group("Moderator", "Moderator vanish group", &["admin", "mod"]),
    );
    groups
}
