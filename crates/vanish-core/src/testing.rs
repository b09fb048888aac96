//! Recording host used by the manager tests.

use std::collections::{HashMap, HashSet};

use crate::host::{
    BroadcastSink, PlayerDirectory, PlayerHandle, PresentationSink, StatusEffect,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Marker(String, bool),
    Silent(String, bool),
    XpAttraction(String, bool),
    Flight(String, bool),
    AddEffect(String, StatusEffect),
    RemoveEffect(String, StatusEffect),
    Show(String, String),
    Hide(String, String),
    RosterAdd(String, String),
    RosterRemove(String, String),
    Tip(String, String),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub players: Vec<PlayerHandle>,
    pub permissions: HashMap<String, HashSet<String>>,
    pub ops: Vec<Op>,
    /// (recipient, message)
    pub messages: Vec<(String, String)>,
    pub broadcasts: Vec<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, name: &str, perms: &[&str]) {
        self.players.push(PlayerHandle::new(name));
        self.permissions.insert(
            name.to_string(),
            perms.iter().map(|p| p.to_string()).collect(),
        );
    }

    pub fn leave(&mut self, name: &str) {
        self.players.retain(|p| p.name != name);
    }

    pub fn set_creative(&mut self, name: &str) {
        if let Some(p) = self.players.iter_mut().find(|p| p.name == name) {
            p.survival = false;
        }
    }

    pub fn has_op(&self, op: &Op) -> bool {
        self.ops.contains(op)
    }

    pub fn inbox(&self, name: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(to, _)| to == name)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.messages.clear();
        self.broadcasts.clear();
    }
}

impl PlayerDirectory for RecordingHost {
    fn online(&self) -> Vec<PlayerHandle> {
        self.players.clone()
    }

    fn has_permission(&self, name: &str, permission: &str) -> bool {
        self.permissions
            .get(name)
            .is_some_and(|perms| perms.contains(permission))
    }
}

impl PresentationSink for RecordingHost {
    fn set_vanish_marker(&mut self, player: &str, on: bool) {
        self.ops.push(Op::Marker(player.into(), on));
    }

    fn set_silent(&mut self, player: &str, silent: bool) {
        self.ops.push(Op::Silent(player.into(), silent));
    }

    fn set_xp_attraction(&mut self, player: &str, enabled: bool) {
        self.ops.push(Op::XpAttraction(player.into(), enabled));
    }

    fn set_flight(&mut self, player: &str, allowed: bool) {
        self.ops.push(Op::Flight(player.into(), allowed));
    }

    fn add_effect(&mut self, player: &str, effect: StatusEffect) {
        self.ops.push(Op::AddEffect(player.into(), effect));
    }

    fn remove_effect(&mut self, player: &str, effect: StatusEffect) {
        self.ops.push(Op::RemoveEffect(player.into(), effect));
    }

    fn show_player(&mut self, viewer: &str, target: &str) {
        self.ops.push(Op::Show(viewer.into(), target.into()));
    }

    fn hide_player(&mut self, viewer: &str, target: &str) {
        self.ops.push(Op::Hide(viewer.into(), target.into()));
    }

    fn roster_add(&mut self, viewer: &str, target: &str) {
        self.ops.push(Op::RosterAdd(viewer.into(), target.into()));
    }

    fn roster_remove(&mut self, viewer: &str, target: &str) {
        self.ops.push(Op::RosterRemove(viewer.into(), target.into()));
    }

    fn send_tip(&mut self, player: &str, message: &str) {
        self.ops.push(Op::Tip(player.into(), message.into()));
    }
}

impl BroadcastSink for RecordingHost {
    fn send_message(&mut self, player: &str, message: &str) {
        self.messages.push((player.into(), message.into()));
    }

    fn broadcast(&mut self, message: &str) {
        self.broadcasts.push(message.into());
    }

    fn broadcast_permission(&mut self, permission: &str, message: &str, exclude: Option<&str>) {
        let recipients: Vec<String> = self
            .players
            .iter()
            .map(|p| p.name.clone())
            .filter(|n| Some(n.as_str()) != exclude && self.has_permission(n, permission))
            .collect();
        for name in recipients {
            self.messages.push((name, message.into()));
        }
    }
}
