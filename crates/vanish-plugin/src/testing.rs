//! In-memory `ServerApi` that applies writes immediately.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use vanish_plugin_api::{GameMode, LogLevel, PluginBlockPos, PluginPlayer, ServerApi};

pub(crate) fn player(name: &str) -> PluginPlayer {
    PluginPlayer {
        name: name.into(),
        uuid: format!("uuid-{name}"),
        gamemode: GameMode::Survival,
        spawned: true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scheduled {
    pub task_id: u32,
    pub delay: u64,
    pub interval: Option<u64>,
}

#[derive(Default)]
pub(crate) struct MockApi {
    pub players: Vec<PluginPlayer>,
    pub permissions: BTreeMap<String, BTreeSet<String>>,
    pub name_tags: BTreeMap<String, String>,
    pub tick: u64,
    pub messages: Vec<(String, String)>,
    pub tips: Vec<(String, String)>,
    pub broadcasts: Vec<String>,
    pub staff: Vec<(String, String)>,
    /// `(viewer, target)` pairs currently hidden.
    pub hidden: BTreeSet<(String, String)>,
    pub off_roster: BTreeSet<(String, String)>,
    pub flight: BTreeMap<String, bool>,
    pub silent: BTreeMap<String, bool>,
    pub effects: BTreeSet<(String, i32)>,
    pub score_tags: BTreeMap<(String, String), String>,
    pub silent_breaks: Vec<(String, PluginBlockPos)>,
    pub silent_places: Vec<(String, PluginBlockPos, u32)>,
    pub readonly_opens: Vec<(String, PluginBlockPos)>,
    pub query: Option<(Vec<String>, u32)>,
    pub scheduled: Vec<Scheduled>,
    pub cancelled: Vec<u32>,
    pub commands: Vec<String>,
    pub logs: RefCell<Vec<(LogLevel, String)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, name: &str, perms: &[&str]) -> PluginPlayer {
        let p = player(name);
        self.players.push(p.clone());
        self.permissions
            .insert(name.into(), perms.iter().map(|s| s.to_string()).collect());
        p
    }

    pub fn leave(&mut self, name: &str) -> Option<PluginPlayer> {
        let index = self.players.iter().position(|p| p.name == name)?;
        Some(self.players.remove(index))
    }

    pub fn sees(&self, viewer: &str, target: &str) -> bool {
        !self.hidden.contains(&(viewer.to_string(), target.to_string()))
    }

    pub fn inbox(&self, name: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(to, _)| to == name)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn score(&self, name: &str, tag: &str) -> Option<&str> {
        self.score_tags
            .get(&(name.to_string(), tag.to_string()))
            .map(String::as_str)
    }
}

impl ServerApi for MockApi {
    fn online_players(&self) -> Vec<PluginPlayer> {
        self.players.clone()
    }

    fn get_player(&self, name: &str) -> Option<PluginPlayer> {
        self.players.iter().find(|p| p.name == name).cloned()
    }

    fn has_permission(&self, name: &str, permission: &str) -> bool {
        self.permissions
            .get(name)
            .is_some_and(|perms| perms.contains(permission))
    }

    fn name_tag(&self, name: &str) -> Option<String> {
        self.get_player(name)?;
        Some(
            self.name_tags
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
        )
    }

    fn send_message(&mut self, player_name: &str, message: &str) {
        self.messages.push((player_name.into(), message.into()));
    }

    fn send_tip(&mut self, player_name: &str, message: &str) {
        self.tips.push((player_name.into(), message.into()));
    }

    fn broadcast_message(&mut self, message: &str) {
        self.broadcasts.push(message.into());
    }

    fn broadcast_to_permission(&mut self, permission: &str, message: &str, exclude: Option<&str>) {
        let receivers: Vec<String> = self
            .players
            .iter()
            .filter(|p| Some(p.name.as_str()) != exclude && self.has_permission(&p.name, permission))
            .map(|p| p.name.clone())
            .collect();
        for name in receivers {
            self.staff.push((name, message.into()));
        }
    }

    fn set_name_tag(&mut self, player_name: &str, tag: &str) {
        self.name_tags.insert(player_name.into(), tag.into());
    }

    fn set_silent(&mut self, player_name: &str, silent: bool) {
        self.silent.insert(player_name.into(), silent);
    }

    fn set_xp_attraction(&mut self, _player_name: &str, _enabled: bool) {}

    fn set_flight(&mut self, player_name: &str, allowed: bool) {
        self.flight.insert(player_name.into(), allowed);
    }

    fn add_effect(&mut self, player_name: &str, effect_id: i32) {
        self.effects.insert((player_name.into(), effect_id));
    }

    fn remove_effect(&mut self, player_name: &str, effect_id: i32) {
        self.effects.remove(&(player_name.into(), effect_id));
    }

    fn show_player(&mut self, viewer: &str, target: &str) {
        self.hidden.remove(&(viewer.into(), target.into()));
    }

    fn hide_player(&mut self, viewer: &str, target: &str) {
        self.hidden.insert((viewer.into(), target.into()));
    }

    fn player_list_add(&mut self, viewer: &str, target: &str) {
        self.off_roster.remove(&(viewer.into(), target.into()));
    }

    fn player_list_remove(&mut self, viewer: &str, target: &str) {
        self.off_roster.insert((viewer.into(), target.into()));
    }

    fn set_score_tag(&mut self, player_name: &str, tag: &str, value: &str) {
        self.score_tags
            .insert((player_name.into(), tag.into()), value.into());
    }

    fn break_block_silently(&mut self, player_name: &str, position: PluginBlockPos) {
        self.silent_breaks.push((player_name.into(), position));
    }

    fn place_block_silently(&mut self, player_name: &str, position: PluginBlockPos, block_id: u32) {
        self.silent_places.push((player_name.into(), position, block_id));
    }

    fn open_container_readonly(&mut self, player_name: &str, position: PluginBlockPos) {
        self.readonly_opens.push((player_name.into(), position));
    }

    fn set_query_info(&mut self, players: Vec<String>, count: u32) {
        self.query = Some((players, count));
    }

    fn get_tick(&self) -> u64 {
        self.tick
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.logs.borrow_mut().push((level, message.into()));
    }

    fn schedule_delayed(&mut self, _plugin_name: &str, delay_ticks: u64, task_id: u32) {
        self.scheduled.push(Scheduled {
            task_id,
            delay: delay_ticks,
            interval: None,
        });
    }

    fn schedule_repeating(
        &mut self,
        _plugin_name: &str,
        delay_ticks: u64,
        interval_ticks: u64,
        task_id: u32,
    ) {
        self.scheduled.push(Scheduled {
            task_id,
            delay: delay_ticks,
            interval: Some(interval_ticks),
        });
    }

    fn cancel_task(&mut self, _plugin_name: &str, task_id: u32) {
        self.cancelled.push(task_id);
    }

    fn register_command(&mut self, name: &str, _description: &str, _plugin_name: &str) {
        self.commands.push(name.into());
    }
}
