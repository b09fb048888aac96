//! Simulated players and the world state plugins act on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};
use vanish_plugin_api::{GameMode, PluginBlockPos, PluginPlayer};

use crate::permissions::PermissionStore;
use crate::plugin_manager::{PendingAction, ServerSnapshot};

/// Server-side view of one connected player.
#[derive(Debug, Clone)]
pub struct SimPlayer {
    pub name: String,
    pub uuid: String,
    pub gamemode: GameMode,
    pub spawned: bool,
    pub name_tag: String,
    pub silent: bool,
    pub xp_attraction: bool,
    pub can_fly: bool,
    pub effects: BTreeSet<i32>,
    /// Players this client does not render.
    pub hidden: BTreeSet<String>,
    /// Players missing from this client's player list.
    pub off_roster: BTreeSet<String>,
    pub score_tags: BTreeMap<String, String>,
    pub inbox: Vec<String>,
    pub tip: Option<String>,
}

impl SimPlayer {
    pub fn new(name: &str, gamemode: GameMode) -> Self {
        Self {
            name: name.to_string(),
            uuid: format!("00000000-0000-0000-0000-{:012x}", rand::random::<u64>() & 0xffff_ffff_ffff),
            gamemode,
            spawned: true,
            name_tag: name.to_string(),
            silent: false,
            xp_attraction: true,
            can_fly: gamemode != GameMode::Survival,
            effects: BTreeSet::new(),
            hidden: BTreeSet::new(),
            off_roster: BTreeSet::new(),
            score_tags: BTreeMap::new(),
            inbox: Vec::new(),
            tip: None,
        }
    }

    pub fn to_plugin(&self) -> PluginPlayer {
        PluginPlayer {
            name: self.name.clone(),
            uuid: self.uuid.clone(),
            gamemode: self.gamemode,
            spawned: self.spawned,
        }
    }

    pub fn sees(&self, other: &str) -> bool {
        !self.hidden.contains(other)
    }
}

/// All connected players, the block grid touched by plugins, and the query
/// response.
#[derive(Debug, Default)]
pub struct SimWorld {
    players: Vec<SimPlayer>,
    pub blocks: HashMap<PluginBlockPos, u32>,
    pub query: (Vec<String>, u32),
    pub tick: u64,
    /// Lines addressed to the console.
    pub console: Vec<String>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[SimPlayer] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&SimPlayer> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut SimPlayer> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    /// Case-insensitive exact lookup used by console commands.
    pub fn find(&self, name: &str) -> Option<&SimPlayer> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn add_player(&mut self, player: SimPlayer) -> bool {
        if self.player(&player.name).is_some() {
            return false;
        }
        self.players.push(player);
        true
    }

    pub fn remove_player(&mut self, name: &str) -> Option<SimPlayer> {
        let index = self.players.iter().position(|p| p.name == name)?;
        let removed = self.players.remove(index);
        for p in &mut self.players {
            p.hidden.remove(name);
            p.off_roster.remove(name);
        }
        Some(removed)
    }

    pub fn online_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn snapshot(&self, permissions: &PermissionStore) -> ServerSnapshot {
        ServerSnapshot {
            players: self.players.iter().map(SimPlayer::to_plugin).collect(),
            name_tags: self
                .players
                .iter()
                .map(|p| (p.name.clone(), p.name_tag.clone()))
                .collect(),
            permissions: self
                .players
                .iter()
                .map(|p| (p.name.clone(), permissions.nodes_for(&p.name)))
                .collect(),
            current_tick: self.tick,
        }
    }

    /// Deliver a line to a player's inbox, or the console.
    pub fn deliver(&mut self, name: &str, message: &str) {
        if let Some(p) = self.player_mut(name) {
            p.inbox.push(message.to_string());
        } else {
            self.console.push(format!("[{name}] {message}"));
        }
    }

    pub fn broadcast(&mut self, message: &str) {
        for p in &mut self.players {
            p.inbox.push(message.to_string());
        }
        self.console.push(message.to_string());
    }

    pub fn apply_all(&mut self, actions: Vec<PendingAction>, permissions: &PermissionStore) {
        for action in actions {
            self.apply(action, permissions);
        }
    }

    /// Apply one deferred plugin write. Writes naming an offline player are
    /// dropped.
    pub fn apply(&mut self, action: PendingAction, permissions: &PermissionStore) {
        match action {
            PendingAction::SendMessage {
                player_name,
                message,
            } => self.deliver(&player_name, &message),
            PendingAction::SendTip {
                player_name,
                message,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.tip = Some(message);
                }
            }
            PendingAction::BroadcastMessage { message } => self.broadcast(&message),
            PendingAction::BroadcastToPermission {
                permission,
                message,
                exclude,
            } => {
                for p in &mut self.players {
                    if Some(&p.name) != exclude.as_ref() && permissions.has(&p.name, &permission) {
                        p.inbox.push(message.clone());
                    }
                }
            }
            PendingAction::SetNameTag { player_name, tag } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.name_tag = tag;
                }
            }
            PendingAction::SetSilent {
                player_name,
                silent,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.silent = silent;
                }
            }
            PendingAction::SetXpAttraction {
                player_name,
                enabled,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.xp_attraction = enabled;
                }
            }
            PendingAction::SetFlight {
                player_name,
                allowed,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.can_fly = allowed;
                }
            }
            PendingAction::AddEffect {
                player_name,
                effect_id,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.effects.insert(effect_id);
                }
            }
            PendingAction::RemoveEffect {
                player_name,
                effect_id,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.effects.remove(&effect_id);
                }
            }
            PendingAction::ShowPlayer { viewer, target } => {
                if let Some(p) = self.player_mut(&viewer) {
                    p.hidden.remove(&target);
                }
            }
            PendingAction::HidePlayer { viewer, target } => {
                if let Some(p) = self.player_mut(&viewer) {
                    p.hidden.insert(target);
                }
            }
            PendingAction::PlayerListAdd { viewer, target } => {
                if let Some(p) = self.player_mut(&viewer) {
                    p.off_roster.remove(&target);
                }
            }
            PendingAction::PlayerListRemove { viewer, target } => {
                if let Some(p) = self.player_mut(&viewer) {
                    p.off_roster.insert(target);
                }
            }
            PendingAction::SetScoreTag {
                player_name,
                tag,
                value,
            } => {
                if let Some(p) = self.player_mut(&player_name) {
                    p.score_tags.insert(tag, value);
                }
            }
            PendingAction::BreakBlockSilently {
                player_name,
                position,
            } => {
                self.blocks.remove(&position);
                debug!("{player_name} silently broke block at {position:?}");
            }
            PendingAction::PlaceBlockSilently {
                player_name,
                position,
                block_id,
            } => {
                self.blocks.insert(position, block_id);
                debug!("{player_name} silently placed {block_id} at {position:?}");
            }
            PendingAction::OpenContainerReadonly {
                player_name,
                position,
            } => {
                self.deliver(
                    &player_name,
                    &format!("[read-only container at {} {} {}]", position.x, position.y, position.z),
                );
            }
            PendingAction::SetQueryInfo { players, count } => {
                self.query = (players, count);
            }
            other => info!("Ignoring plugin action outside the world: {other:?}"),
        }
    }
}
