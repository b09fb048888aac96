//! Adapts [`ServerApi`] to the vanish core's collaborator traits.

use vanish_core::host::{
    BroadcastSink, PlayerDirectory, PlayerHandle, PresentationSink, StatusEffect,
};
use vanish_plugin_api::{effect, PluginPlayer, ServerApi};

/// Prefix added to a vanished player's name tag.
pub const VANISH_TAG: &str = "§6[V] §r";

fn handle(player: PluginPlayer) -> PlayerHandle {
    PlayerHandle {
        survival: player.is_survival(),
        spawned: player.spawned,
        name: player.name,
    }
}

fn effect_id(effect: StatusEffect) -> i32 {
    match effect {
        StatusEffect::NightVision => effect::NIGHT_VISION,
    }
}

/// Read-only view of the server for policy checks and counters.
pub struct ApiDirectory<'a> {
    api: &'a dyn ServerApi,
}

impl<'a> ApiDirectory<'a> {
    pub fn new(api: &'a dyn ServerApi) -> Self {
        Self { api }
    }
}

impl PlayerDirectory for ApiDirectory<'_> {
    fn online(&self) -> Vec<PlayerHandle> {
        self.api.online_players().into_iter().map(handle).collect()
    }

    fn has_permission(&self, name: &str, permission: &str) -> bool {
        self.api.has_permission(name, permission)
    }

    fn player(&self, name: &str) -> Option<PlayerHandle> {
        self.api.get_player(name).map(handle)
    }

    fn find(&self, prefix: &str) -> Option<PlayerHandle> {
        self.api.find_player(prefix).map(handle)
    }
}

/// Full read/write bridge handed to the manager during a callback.
pub struct HostBridge<'a> {
    api: &'a mut dyn ServerApi,
}

impl<'a> HostBridge<'a> {
    pub fn new(api: &'a mut dyn ServerApi) -> Self {
        Self { api }
    }

    fn directory(&self) -> ApiDirectory<'_> {
        ApiDirectory::new(&*self.api)
    }
}

impl PlayerDirectory for HostBridge<'_> {
    fn online(&self) -> Vec<PlayerHandle> {
        self.directory().online()
    }

    fn has_permission(&self, name: &str, permission: &str) -> bool {
        self.api.has_permission(name, permission)
    }

    fn player(&self, name: &str) -> Option<PlayerHandle> {
        self.directory().player(name)
    }

    fn find(&self, prefix: &str) -> Option<PlayerHandle> {
        self.directory().find(prefix)
    }
}

impl PresentationSink for HostBridge<'_> {
    fn set_vanish_marker(&mut self, player: &str, on: bool) {
        let current = self
            .api
            .name_tag(player)
            .unwrap_or_else(|| player.to_string());
        match (on, current.strip_prefix(VANISH_TAG)) {
            (true, None) => self
                .api
                .set_name_tag(player, &format!("{VANISH_TAG}{current}")),
            (false, Some(plain)) => self.api.set_name_tag(player, plain),
            _ => {}
        }
    }

    fn set_silent(&mut self, player: &str, silent: bool) {
        self.api.set_silent(player, silent);
    }

    fn set_xp_attraction(&mut self, player: &str, enabled: bool) {
        self.api.set_xp_attraction(player, enabled);
    }

    fn set_flight(&mut self, player: &str, allowed: bool) {
        self.api.set_flight(player, allowed);
    }

    fn add_effect(&mut self, player: &str, effect: StatusEffect) {
        self.api.add_effect(player, effect_id(effect));
    }

    fn remove_effect(&mut self, player: &str, effect: StatusEffect) {
        self.api.remove_effect(player, effect_id(effect));
    }

    fn show_player(&mut self, viewer: &str, target: &str) {
        self.api.show_player(viewer, target);
    }

    fn hide_player(&mut self, viewer: &str, target: &str) {
        self.api.hide_player(viewer, target);
    }

    fn roster_add(&mut self, viewer: &str, target: &str) {
        self.api.player_list_add(viewer, target);
    }

    fn roster_remove(&mut self, viewer: &str, target: &str) {
        self.api.player_list_remove(viewer, target);
    }

    fn send_tip(&mut self, player: &str, message: &str) {
        self.api.send_tip(player, message);
    }
}

impl BroadcastSink for HostBridge<'_> {
    fn send_message(&mut self, player: &str, message: &str) {
        self.api.send_message(player, message);
    }

    fn broadcast(&mut self, message: &str) {
        self.api.broadcast_message(message);
    }

    fn broadcast_permission(&mut self, permission: &str, message: &str, exclude: Option<&str>) {
        self.api.broadcast_to_permission(permission, message, exclude);
    }
}
