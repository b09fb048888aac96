//! Collaborator traits the game host implements.

/// Permission nodes checked by the vanish subsystem.
pub mod permission {
    /// See every vanished player regardless of group.
    pub const SEE: &str = "vanish.see";
    pub const USE: &str = "vanish.use";
    pub const USE_OTHER: &str = "vanish.use.other";
    /// Attack other players while vanished.
    pub const ATTACK: &str = "vanish.attack";
    /// Join and leave without the broadcast.
    pub const SILENT: &str = "vanish.silent";
    pub const LIST: &str = "vanish.list";
    pub const STATS: &str = "vanish.stats";
    pub const LOGS: &str = "vanish.logs";
}

/// Snapshot of a connected player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHandle {
    pub name: String,
    pub survival: bool,
    /// Spawned into the world (not still loading).
    pub spawned: bool,
}

impl PlayerHandle {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            survival: true,
            spawned: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEffect {
    NightVision,
}

pub trait PlayerDirectory {
    fn online(&self) -> Vec<PlayerHandle>;

    fn has_permission(&self, name: &str, permission: &str) -> bool;

    /// Exact-name lookup.
    fn player(&self, name: &str) -> Option<PlayerHandle> {
        self.online().into_iter().find(|p| p.name == name)
    }

    /// Case-insensitive lookup: an exact match wins, otherwise the shortest
    /// name starting with `prefix`.
    fn find(&self, prefix: &str) -> Option<PlayerHandle> {
        let needle = prefix.to_lowercase();
        let mut best: Option<PlayerHandle> = None;
        for p in self.online() {
            let lower = p.name.to_lowercase();
            if lower == needle {
                return Some(p);
            }
            if lower.starts_with(&needle)
                && best.as_ref().map_or(true, |b| p.name.len() < b.name.len())
            {
                best = Some(p);
            }
        }
        best
    }

    fn is_connected(&self, name: &str) -> bool {
        self.player(name).is_some()
    }
}

pub trait PresentationSink {
    fn set_vanish_marker(&mut self, player: &str, on: bool);
    fn set_silent(&mut self, player: &str, silent: bool);
    fn set_xp_attraction(&mut self, player: &str, enabled: bool);
    fn set_flight(&mut self, player: &str, allowed: bool);
    fn add_effect(&mut self, player: &str, effect: StatusEffect);
    fn remove_effect(&mut self, player: &str, effect: StatusEffect);
    fn show_player(&mut self, viewer: &str, target: &str);
    fn hide_player(&mut self, viewer: &str, target: &str);
    fn roster_add(&mut self, viewer: &str, target: &str);
    fn roster_remove(&mut self, viewer: &str, target: &str);
    /// Short status line above the hotbar.
    fn send_tip(&mut self, player: &str, message: &str);
}

pub trait BroadcastSink {
    fn send_message(&mut self, player: &str, message: &str);
    fn broadcast(&mut self, message: &str);
    /// Message every online holder of `permission`, except `exclude`.
    fn broadcast_permission(&mut self, permission: &str, message: &str, exclude: Option<&str>);
}

/// Everything the manager needs from the host in one object.
pub trait Host: PlayerDirectory + PresentationSink + BroadcastSink {}

impl<T: PlayerDirectory + PresentationSink + BroadcastSink> Host for T {}
